use std::future::Future;

use crate::error;

const MAX_RETRIES: usize = 3;

/// Re-runs `operation` while it fails with a conflict. Used for inserts
/// whose unique key is generated on the server, so a fresh attempt draws
/// a fresh key.
pub async fn retry_on_conflict<F, Fut, T>(mut operation: F) -> error::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = error::Result<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(e) if e.code == 409 && attempt < MAX_RETRIES => {
                log::warn!("Attempt {} hit a conflict: {}. Retrying...", attempt, e);
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::AddCode;

    #[actix_web::test]
    async fn test_conflicts_are_retried() {
        let calls = Cell::new(0);
        let result = retry_on_conflict(|| {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(anyhow::anyhow!("taken").code(409))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[actix_web::test]
    async fn test_other_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: error::Result<()> = retry_on_conflict(|| {
            calls.set(calls.get() + 1);
            async { Err(anyhow::anyhow!("bad").code(400)) }
        })
        .await;
        assert_eq!(result.unwrap_err().code, 400);
        assert_eq!(calls.get(), 1);
    }
}
