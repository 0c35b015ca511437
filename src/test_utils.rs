//! Test utilities for property-based and orchestration tests
//!
//! This module provides proptest generators and in-process fakes for the
//! fetch and sink collaborators.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a numeric version component without leading zeros
    fn component() -> impl Strategy<Value = u64> {
        prop_oneof![0u64..10, 10u64..1000]
    }

    /// Generate version text in canonical form
    ///
    /// Patch is either absent or non-zero, so parse then format is identity.
    pub fn canonical_version() -> impl Strategy<Value = String> {
        (
            component(),
            component(),
            proptest::option::of(1u64..50),
            proptest::option::of("[0-9A-Za-z][0-9A-Za-z.-]{0,8}"),
        )
            .prop_map(|(major, minor, patch, tag)| {
                let mut text = format!("{major}.{minor}");
                if let Some(patch) = patch {
                    text.push_str(&format!(".{patch}"));
                }
                if let Some(tag) = tag {
                    text.push('-');
                    text.push_str(&tag);
                }
                text
            })
    }

    /// Generate a dependency name
    pub fn dependency_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}"
    }

    /// Generate a valid SHA256 hash (64 hex characters)
    pub fn sha256_hash() -> impl Strategy<Value = String> {
        "[0-9a-f]{64}"
    }
}

#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::core::result::{Message, ResultSink};
    use crate::core::strategy::Fetcher;
    use crate::error::TransportError;

    #[derive(Clone)]
    enum Response {
        Body(Vec<u8>),
        Fail(TransportError),
        Hang,
    }

    /// In-memory fetcher answering from a URL table
    ///
    /// Unknown URLs answer with HTTP 404.
    #[derive(Default)]
    pub struct FakeFetcher {
        responses: Mutex<HashMap<String, Response>>,
        calls: Mutex<Vec<String>>,
        hanging: Arc<Notify>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for `url`
        pub fn respond(&self, url: &str, body: impl Into<String>) {
            self.set(url, Response::Body(body.into().into_bytes()));
        }

        /// Fail every fetch of `url` with `error`
        pub fn fail(&self, url: &str, error: TransportError) {
            self.set(url, Response::Fail(error));
        }

        /// Never complete fetches of `url`
        pub fn hang(&self, url: &str) {
            self.set(url, Response::Hang);
        }

        /// Wait until some fetch started hanging
        pub async fn hang_started(&self) {
            self.hanging.notified().await;
        }

        /// URLs fetched so far, in call order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn set(&self, url: &str, response: Response) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TransportError> {
            self.calls.lock().unwrap().push(locator.to_string());
            let response = self.responses.lock().unwrap().get(locator).cloned();

            match response {
                Some(Response::Body(body)) => Ok(body),
                Some(Response::Fail(error)) => Err(error),
                Some(Response::Hang) => {
                    self.hanging.notify_one();
                    futures::future::pending().await
                }
                None => Err(TransportError::Status {
                    url: locator.to_string(),
                    status: 404,
                }),
            }
        }
    }

    /// Sink that keeps every message it receives
    #[derive(Default)]
    pub struct RecordingSink {
        messages: Mutex<Vec<Message>>,
    }

    impl RecordingSink {
        pub fn messages(&self) -> Vec<Message> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl ResultSink for RecordingSink {
        fn emit(&self, message: &Message) {
            self.messages.lock().unwrap().push(message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_canonical_version_generator(version in canonical_version()) {
            let core = version.split('-').next().unwrap();
            let parts: Vec<&str> = core.split('.').collect();
            prop_assert!(parts.len() == 2 || parts.len() == 3);
            for part in &parts {
                prop_assert!(*part == "0" || !part.starts_with('0'));
            }
            if parts.len() == 3 {
                prop_assert_ne!(parts[2], "0");
            }
        }

        #[test]
        fn test_dependency_name_generator(name in dependency_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn test_sha256_hash_generator(hash in sha256_hash()) {
            prop_assert_eq!(hash.len(), 64);
            prop_assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
