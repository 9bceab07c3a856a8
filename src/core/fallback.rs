use std::future::Future;
use std::fmt::Display;

use crate::models::Source;

/// A value tagged with the scorer that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub value: T,
    pub source: Source,
}

/// Try an optional external assessment, falling back to the heuristic
///
/// `external` is `None` when no external scorer is configured; that path
/// is silent. A failed attempt is logged and replaced by `heuristic()`.
/// There is exactly one attempt, no retries.
pub async fn with_fallback<T, E, Fut, H>(external: Option<Fut>, heuristic: H, subject: &str) -> Scored<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    H: FnOnce() -> T,
{
    let Some(attempt) = external else {
        return Scored {
            value: heuristic(),
            source: Source::Heuristic,
        };
    };

    match attempt.await {
        Ok(value) => Scored {
            value,
            source: Source::Ai,
        },
        Err(e) => {
            tracing::warn!(subject = subject, error = %e, "AI assessment failed, using heuristic");
            Scored {
                value: heuristic(),
                source: Source::Heuristic,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Ready;

    fn no_attempt() -> Option<Ready<Result<u8, String>>> {
        None
    }

    #[tokio::test]
    async fn test_absent_external_uses_heuristic() {
        let scored = with_fallback(no_attempt(), || 7, "test").await;
        assert_eq!(scored, Scored { value: 7, source: Source::Heuristic });
    }

    #[tokio::test]
    async fn test_successful_external_wins() {
        let attempt = std::future::ready(Ok::<u8, String>(42));
        let scored = with_fallback(Some(attempt), || 7, "test").await;
        assert_eq!(scored, Scored { value: 42, source: Source::Ai });
    }

    #[tokio::test]
    async fn test_failed_external_falls_back() {
        let attempt = std::future::ready(Err::<u8, String>("timeout".to_string()));
        let scored = with_fallback(Some(attempt), || 7, "test").await;
        assert_eq!(scored, Scored { value: 7, source: Source::Heuristic });
    }
}
