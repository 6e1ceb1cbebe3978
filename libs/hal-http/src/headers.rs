//! Headers stamped onto every outgoing request.

use crate::error::HttpError;
use crate::secret::SecretString;
use base64::{Engine as _, engine::general_purpose};
use http::{HeaderMap, HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use zeroize::Zeroizing;

/// `Basic base64(username:password)`, marked sensitive.
pub(crate) fn basic_authorization(
    username: &str,
    password: &SecretString,
) -> Result<HeaderValue, HttpError> {
    let pair = Zeroizing::new(format!("{username}:{}", password.expose()));
    let encoded = Zeroizing::new(general_purpose::STANDARD.encode(pair.as_bytes()));
    sensitive(&Zeroizing::new(format!("Basic {}", encoded.as_str())))
}

/// `Bearer <token>`, marked sensitive.
pub(crate) fn bearer_authorization(token: &SecretString) -> Result<HeaderValue, HttpError> {
    sensitive(&Zeroizing::new(format!("Bearer {}", token.expose())))
}

fn sensitive(raw: &Zeroizing<String>) -> Result<HeaderValue, HttpError> {
    let mut value = HeaderValue::from_str(raw)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Inserts each default header the request does not already carry.
#[derive(Clone, Debug)]
pub(crate) struct DefaultHeadersLayer {
    defaults: HeaderMap,
}

impl DefaultHeadersLayer {
    pub(crate) fn new(defaults: HeaderMap) -> Self {
        Self { defaults }
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeaders {
            inner,
            defaults: self.defaults.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DefaultHeaders<S> {
    inner: S,
    defaults: HeaderMap,
}

impl<S, B> Service<Request<B>> for DefaultHeaders<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let headers = req.headers_mut();
        for (name, value) in &self.defaults {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}
