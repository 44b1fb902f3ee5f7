use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

use super::results::{Classification, DropReason, ProbeOutcome, ResultSet};
use crate::catalog::SiteTarget;
use crate::handle::HandleMatcher;
use crate::network::{AgentPool, ProbeResponse, Transport};

/// What a worker reports back when its partition is done
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkerReport {
    pub probed: usize,
    pub slowest: Duration,
}

/// Applies the status / redirect / body-match policy to one response.
pub fn classify(
    target: &SiteTarget,
    response: &ProbeResponse,
    matcher: &HandleMatcher,
) -> Classification {
    match response.status {
        404 => Classification::Dropped(DropReason::NotFound),
        403 => Classification::Recorded(ProbeOutcome::ManualReview(target.clone())),
        200 => {
            let has_match = matcher.is_match(&response.body);
            let redirected = Url::parse(&target.url)
                .map(|requested| requested != response.final_url)
                .unwrap_or(true);

            if redirected && !has_match {
                Classification::Dropped(DropReason::UnrelatedRedirect)
            } else if has_match {
                Classification::Recorded(ProbeOutcome::Confirmed(target.clone()))
            } else {
                Classification::Recorded(ProbeOutcome::Unconfirmed(target.clone()))
            }
        }
        other => Classification::Dropped(DropReason::Status(other)),
    }
}

/// Everything a worker needs besides its own partition
pub struct ProbeContext {
    pub transport: Box<dyn Transport>,
    pub agents: Arc<AgentPool>,
    pub matcher: HandleMatcher,
    pub results: Arc<ResultSet>,
    pub timeout: Duration,
    pub bar: ProgressBar,
}

/// Probes every target of one partition, strictly in order.
///
/// One attempt per target; failures are dropped, never retried.
pub async fn probe_partition(targets: Vec<SiteTarget>, ctx: ProbeContext) -> WorkerReport {
    let mut report = WorkerReport::default();

    for target in targets {
        let user_agent = ctx.agents.random();
        let started = Instant::now();
        let response =
            tokio::time::timeout(ctx.timeout, ctx.transport.get(&target.url, user_agent)).await;
        report.slowest = report.slowest.max(started.elapsed());
        report.probed += 1;

        let classification = match response {
            Ok(Ok(response)) => classify(&target, &response, &ctx.matcher),
            Ok(Err(e)) => {
                debug!(site = %target.name, url = %target.url, error = %e, "request failed");
                Classification::Dropped(DropReason::Transport)
            }
            Err(_) => {
                debug!(site = %target.name, url = %target.url, "request timed out");
                Classification::Dropped(DropReason::Timeout)
            }
        };

        ctx.bar.inc(1);
        ctx.bar.set_message(target.name.clone());

        match classification {
            Classification::Recorded(outcome) => {
                trace!(?outcome, "recording outcome");
                ctx.results.record(outcome);
            }
            Classification::Dropped(reason) => {
                trace!(site = %target.name, ?reason, "dropping target");
                ctx.results.record_dropped();
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;

    fn target() -> SiteTarget {
        SiteTarget {
            name: "Example".to_string(),
            url: "https://example.test/john_doe".to_string(),
        }
    }

    fn matcher() -> HandleMatcher {
        Handle::parse("john_doe").unwrap().matcher().unwrap()
    }

    fn response(status: u16, final_url: &str, body: &str) -> ProbeResponse {
        ProbeResponse {
            status,
            final_url: Url::parse(final_url).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_whole_word_match_is_confirmed() {
        let resp = response(200, "https://example.test/john_doe", "Profile: John_Doe");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Recorded(ProbeOutcome::Confirmed(target()))
        );
    }

    #[test]
    fn test_partial_match_is_unconfirmed() {
        let resp = response(200, "https://example.test/john_doe", "johnsdoe123");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Recorded(ProbeOutcome::Unconfirmed(target()))
        );
    }

    #[test]
    fn test_forbidden_goes_to_manual_review_even_with_match() {
        let resp = response(403, "https://example.test/john_doe", "john_doe");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Recorded(ProbeOutcome::ManualReview(target()))
        );
    }

    #[test]
    fn test_not_found_is_dropped() {
        let resp = response(404, "https://example.test/john_doe", "john_doe");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Dropped(DropReason::NotFound)
        );
    }

    #[test]
    fn test_redirect_without_match_is_dropped() {
        let resp = response(200, "https://example.test/login", "Sign in");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Dropped(DropReason::UnrelatedRedirect)
        );
    }

    #[test]
    fn test_redirect_with_match_is_confirmed() {
        let resp = response(200, "https://example.test/u/42", "@john_doe");
        assert_eq!(
            classify(&target(), &resp, &matcher()),
            Classification::Recorded(ProbeOutcome::Confirmed(target()))
        );
    }

    #[test]
    fn test_trailing_slash_normalisation_is_not_a_redirect() {
        let bare = SiteTarget {
            name: "Newgrounds".to_string(),
            url: "https://john_doe.newgrounds.test".to_string(),
        };
        let resp = response(200, "https://john_doe.newgrounds.test/", "nothing here");
        assert_eq!(
            classify(&bare, &resp, &matcher()),
            Classification::Recorded(ProbeOutcome::Unconfirmed(bare.clone()))
        );
    }

    #[test]
    fn test_other_statuses_are_dropped() {
        for status in [301, 429, 500, 503] {
            let resp = response(status, "https://example.test/john_doe", "john_doe");
            assert_eq!(
                classify(&target(), &resp, &matcher()),
                Classification::Dropped(DropReason::Status(status))
            );
        }
    }
}
