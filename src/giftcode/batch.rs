/// Batch orchestration for mass gift-code redemption.
///
/// One batch run walks an account list sequentially with a fixed pause
/// between accounts, classifies each redemption into one of three buckets
/// and never aborts on a single account's failure. Retrying re-runs the
/// same loop over the failed bucket only.
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};

use super::client::{CaptchaError, GiftCodeClient};
use super::solver::CaptchaModel;

/// Redemption outcome codes consumed from the API
const CODE_SUCCESS: i64 = 20000;
const CODE_ALREADY_REDEEMED: i64 = 40008;

/// Classification of one account's redemption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    Success,
    AlreadyRedeemed,
    Failed,
}

impl RedeemOutcome {
    /// Map an API error code to an outcome. 20000 is success, 40008 is
    /// already-redeemed, every other integer is a failure.
    pub fn from_code(code: i64) -> Self {
        match code {
            CODE_SUCCESS => RedeemOutcome::Success,
            CODE_ALREADY_REDEEMED => RedeemOutcome::AlreadyRedeemed,
            _ => RedeemOutcome::Failed,
        }
    }
}

/// The three buckets of one batch run; their sizes always sum to the
/// number of processed accounts
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub success: Vec<u64>,
    pub already_redeemed: Vec<u64>,
    pub failed: Vec<u64>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fid: u64, outcome: RedeemOutcome) {
        match outcome {
            RedeemOutcome::Success => self.success.push(fid),
            RedeemOutcome::AlreadyRedeemed => self.already_redeemed.push(fid),
            RedeemOutcome::Failed => self.failed.push(fid),
        }
    }

    pub fn total(&self) -> usize {
        self.success.len() + self.already_redeemed.len() + self.failed.len()
    }
}

/// Redeems a gift code for one account. Abstracted so the batch driver is
/// testable without the vendor API.
pub trait RedeemBackend {
    fn redeem_one(
        &self,
        fid: u64,
        code: &str,
    ) -> impl std::future::Future<Output = RedeemOutcome> + Send;
}

/// Run a batch over `ids`, pausing `delay` between accounts.
///
/// A snapshot of the buckets is emitted through `progress` after every
/// account. The send is best-effort; a dropped receiver does not stop the
/// run.
pub async fn run_batch<B: RedeemBackend>(
    backend: &B,
    ids: &[u64],
    code: &str,
    delay: Duration,
    progress: &UnboundedSender<BatchOutcome>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::new();

    for (index, &fid) in ids.iter().enumerate() {
        let result = backend.redeem_one(fid, code).await;
        outcome.record(fid, result);
        let _ = progress.send(outcome.clone());

        if index + 1 < ids.len() {
            sleep(delay).await;
        }
    }

    outcome
}

/// Production backend: player lookup, captcha fetch, OCR, then redemption.
///
/// Each account runs on its own cookie-keeping session, since the vendor
/// associates the captcha with the session that fetched the player. When
/// the captcha cannot be fetched or solved the redemption call is skipped
/// entirely and the account lands in the failed bucket; the retry button
/// covers it on the next pass.
pub struct GiftCodeRedeemer {
    model: Arc<CaptchaModel>,
}

impl GiftCodeRedeemer {
    pub fn new(model: Arc<CaptchaModel>) -> Self {
        Self { model }
    }
}

impl RedeemBackend for GiftCodeRedeemer {
    async fn redeem_one(&self, fid: u64, code: &str) -> RedeemOutcome {
        let client = match GiftCodeClient::new() {
            Ok(client) => client,
            Err(e) => {
                warn!("Could not open a session for {}: {}", fid, e);
                return RedeemOutcome::Failed;
            }
        };

        let player = match client.player_info(fid).await {
            Ok(player) => player,
            Err(e) => {
                warn!("Player lookup failed for {}: {}", fid, e);
                return RedeemOutcome::Failed;
            }
        };

        let image = match client.fetch_captcha(player.fid).await {
            Ok(image) => image,
            Err(CaptchaError::RateLimited) => {
                warn!("Captcha rate-limited for {}", fid);
                return RedeemOutcome::Failed;
            }
            Err(e) => {
                warn!("Captcha fetch failed for {}: {}", fid, e);
                return RedeemOutcome::Failed;
            }
        };

        let captcha = match self.model.solve(&image) {
            Ok(captcha) => captcha,
            Err(e) => {
                warn!("Captcha OCR failed for {}: {}", fid, e);
                return RedeemOutcome::Failed;
            }
        };

        match client.redeem(player.fid, code, &captcha).await {
            Ok((err_code, msg)) => {
                let outcome = RedeemOutcome::from_code(err_code);
                info!(
                    "Redeem {} for {}: code {} ({}) -> {:?}",
                    code, fid, err_code, msg, outcome
                );
                outcome
            }
            Err(e) => {
                warn!("Redeem call failed for {}: {}", fid, e);
                RedeemOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Stub backend mapping account ids to fixed API error codes,
    /// recording every processed account
    struct StubBackend {
        codes: HashMap<u64, i64>,
        calls: Mutex<Vec<u64>>,
    }

    impl StubBackend {
        fn new(codes: &[(u64, i64)]) -> Self {
            Self {
                codes: codes.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RedeemBackend for StubBackend {
        async fn redeem_one(&self, fid: u64, _code: &str) -> RedeemOutcome {
            self.calls.lock().unwrap().push(fid);
            RedeemOutcome::from_code(self.codes.get(&fid).copied().unwrap_or(500))
        }
    }

    #[test]
    fn test_from_code_classification_is_exhaustive() {
        assert_eq!(RedeemOutcome::from_code(20000), RedeemOutcome::Success);
        assert_eq!(RedeemOutcome::from_code(40008), RedeemOutcome::AlreadyRedeemed);
        assert_eq!(RedeemOutcome::from_code(0), RedeemOutcome::Failed);
        assert_eq!(RedeemOutcome::from_code(500), RedeemOutcome::Failed);
        assert_eq!(RedeemOutcome::from_code(-1), RedeemOutcome::Failed);
        assert_eq!(RedeemOutcome::from_code(i64::MAX), RedeemOutcome::Failed);
    }

    #[test]
    fn test_buckets_partition_the_input() {
        let mut outcome = BatchOutcome::new();
        outcome.record(1, RedeemOutcome::Success);
        outcome.record(2, RedeemOutcome::AlreadyRedeemed);
        outcome.record(3, RedeemOutcome::Failed);
        outcome.record(4, RedeemOutcome::Failed);
        assert_eq!(outcome.total(), 4);
    }

    #[tokio::test]
    async fn test_batch_classifies_per_account() {
        let backend = StubBackend::new(&[(1, 20000), (2, 40008), (3, 500)]);
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_batch(&backend, &[1, 2, 3], "ABC", Duration::ZERO, &tx).await;

        assert_eq!(outcome.success, vec![1]);
        assert_eq!(outcome.already_redeemed, vec![2]);
        assert_eq!(outcome.failed, vec![3]);
        assert_eq!(outcome.total(), 3);
    }

    #[tokio::test]
    async fn test_batch_emits_a_snapshot_per_account() {
        let backend = StubBackend::new(&[(1, 20000), (2, 500)]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = run_batch(&backend, &[1, 2], "ABC", Duration::ZERO, &tx).await;
        drop(tx);

        let mut snapshots = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            snapshots.push(snapshot);
        }

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].total(), 1);
        assert_eq!(snapshots[1].total(), 2);
        assert_eq!(outcome.total(), 2);
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let backend = StubBackend::new(&[(1, 500), (2, 500), (3, 20000)]);
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_batch(&backend, &[1, 2, 3], "ABC", Duration::ZERO, &tx).await;

        assert_eq!(outcome.failed, vec![1, 2]);
        assert_eq!(outcome.success, vec![3]);
    }

    #[tokio::test]
    async fn test_retry_touches_exactly_the_failed_bucket() {
        let backend = StubBackend::new(&[(1, 20000), (2, 500), (3, 500), (4, 40008)]);
        let (tx, _rx) = mpsc::unbounded_channel();

        let first = run_batch(&backend, &[1, 2, 3, 4], "ABC", Duration::ZERO, &tx).await;
        assert_eq!(first.failed, vec![2, 3]);

        backend.calls.lock().unwrap().clear();
        let retry = run_batch(&backend, &first.failed, "ABC", Duration::ZERO, &tx).await;

        assert_eq!(*backend.calls.lock().unwrap(), vec![2, 3]);
        assert_eq!(retry.total(), first.failed.len());
    }

    #[tokio::test]
    async fn test_empty_batch_produces_empty_buckets() {
        let backend = StubBackend::new(&[]);
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_batch(&backend, &[], "ABC", Duration::ZERO, &tx).await;
        assert_eq!(outcome.total(), 0);
    }
}
