//! Retry-then-fallback over an ordered list of models.
//!
//! Each model gets a fixed number of attempts with exponential backoff
//! between them. Non-retryable errors (see [`SourceError::is_non_retryable`])
//! skip straight to the next model. The model that served the request is
//! reported back as a [`ModelUse`].

use std::future::Future;
use std::time::Duration;

use last30_core::ModelUse;

use crate::error::SourceError;

/// Upper bound for the delay between two attempts on the same model.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ModelChain {
    models: Vec<String>,
    attempts_per_model: u32,
    base_backoff: Duration,
}

impl ModelChain {
    #[must_use]
    pub fn new(models: Vec<String>, attempts_per_model: u32, base_backoff: Duration) -> Self {
        Self {
            models,
            attempts_per_model: attempts_per_model.max(1),
            base_backoff,
        }
    }

    /// Run `call` against each model in order until one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ModelsExhausted`] listing every failed attempt
    /// when no model produced a response.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<(T, ModelUse), SourceError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let Some(requested) = self.models.first() else {
            return Err(SourceError::ModelsExhausted {
                failures: vec!["no models configured".to_string()],
            });
        };

        let mut failures = Vec::new();
        let mut attempts = 0u32;

        for model in &self.models {
            let mut backoff = self.base_backoff;

            for attempt in 0..self.attempts_per_model {
                attempts += 1;
                match call(model.clone()).await {
                    Ok(value) => {
                        if model != requested {
                            tracing::warn!(
                                requested = requested.as_str(),
                                served = model.as_str(),
                                "fallback model served request"
                            );
                        } else if attempt > 0 {
                            tracing::info!(model = model.as_str(), attempt, "model recovered after retries");
                        }
                        return Ok((
                            value,
                            ModelUse {
                                requested: requested.clone(),
                                served: model.clone(),
                                attempts,
                            },
                        ));
                    }
                    Err(e) => {
                        failures.push(format!(
                            "{model} attempt {}/{}: {e}",
                            attempt + 1,
                            self.attempts_per_model
                        ));

                        if e.is_non_retryable() {
                            tracing::warn!(model = model.as_str(), %e, "non-retryable error, switching model");
                            break;
                        }

                        if attempt + 1 < self.attempts_per_model {
                            tracing::warn!(
                                model = model.as_str(),
                                attempt = attempt + 1,
                                %e,
                                "model call failed, retrying"
                            );
                            tokio::time::sleep(backoff).await;
                            backoff = backoff.saturating_mul(2).min(MAX_BACKOFF);
                        }
                    }
                }
            }
        }

        Err(SourceError::ModelsExhausted { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn chain(models: &[&str]) -> ModelChain {
        ModelChain::new(
            models.iter().map(ToString::to_string).collect(),
            2,
            Duration::from_millis(1),
        )
    }

    fn server_error() -> SourceError {
        SourceError::Api {
            status: 500,
            message: "boom".into(),
        }
    }

    #[tokio::test]
    async fn first_model_success_is_not_degraded() {
        let (value, used) = chain(&["primary", "fallback"])
            .run(|model| async move { Ok::<_, SourceError>(model) })
            .await
            .unwrap();
        assert_eq!(value, "primary");
        assert_eq!(used.attempts, 1);
        assert!(!used.is_degraded());
    }

    #[tokio::test]
    async fn two_failures_fall_back_on_third_attempt() {
        let calls = Mutex::new(Vec::new());
        let (_, used) = chain(&["primary", "fallback"])
            .run(|model| {
                calls.lock().unwrap().push(model.clone());
                async move {
                    if model == "primary" {
                        Err(server_error())
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["primary", "primary", "fallback"]
        );
        assert_eq!(used.served, "fallback");
        assert_eq!(used.requested, "primary");
        assert_eq!(used.attempts, 3);
        assert!(used.is_degraded());
    }

    #[tokio::test]
    async fn non_retryable_error_skips_to_next_model() {
        let calls = Mutex::new(0u32);
        let (_, used) = chain(&["primary", "fallback"])
            .run(|model| {
                *calls.lock().unwrap() += 1;
                async move {
                    if model == "primary" {
                        Err(SourceError::Api {
                            status: 404,
                            message: "model not found".into(),
                        })
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(used.attempts, 2);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_every_attempt() {
        let err = chain(&["a", "b"])
            .run(|_| async { Err::<(), _>(server_error()) })
            .await
            .unwrap_err();
        match err {
            SourceError::ModelsExhausted { failures } => assert_eq!(failures.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_chain_fails_without_calling() {
        let err = chain(&[])
            .run(|_| async { Ok::<_, SourceError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::ModelsExhausted { .. }));
    }
}
