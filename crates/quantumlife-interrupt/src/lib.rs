//! Interrupt Permission Engine — a pure rule engine mapping candidates,
//! policy, and global modifiers to ordered Permission Decisions.
//!
//! Evaluation runs the four rules in fixed order: trust-fragile override,
//! missing/allow-none policy, per-candidate commerce-first eligibility, then
//! rate-limiting with a deterministic tie-break. Cannot fail — an unknown
//! allowance degrades to `policy_denies`.

#![forbid(unsafe_code)]

use quantumlife_core::buckets::{HorizonBucket, MagnitudeBucket};
use quantumlife_core::hashing::canonical_string;
use quantumlife_core::ids::CandidateHash;

/// Platform hard cap on permitted interrupts per day, regardless of policy.
pub const HARD_CAP_PER_DAY: u32 = 2;

const CANONICAL_TAG_INPUT: &str = "INTERRUPT_INPUT";
const CANONICAL_TAG_STATUS: &str = "INTERRUPT_STATUS";
const CANONICAL_VERSION: &str = "v1";

/// Which attention domain a candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleType {
    Human,
    Institution,
    Commerce,
}

impl CircleType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Institution => "institution",
            Self::Commerce => "commerce",
        }
    }
}

/// What the user currently allows interrupts to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    AllowNone,
    AllowHumansNow,
    AllowInstitutionsSoon,
    AllowTwoPerDay,
}

impl Allowance {
    fn as_str(self) -> &'static str {
        match self {
            Self::AllowNone => "allow_none",
            Self::AllowHumansNow => "allow_humans_now",
            Self::AllowInstitutionsSoon => "allow_institutions_soon",
            Self::AllowTwoPerDay => "allow_two_per_day",
        }
    }
}

/// User-owned interrupt policy, snapshotted into each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptPolicy {
    pub allowance: Allowance,
    pub max_per_day: u32,
}

/// An ephemeral candidate for interruption, consumed by this engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptCandidate {
    pub candidate_hash: CandidateHash,
    pub circle_type: CircleType,
    pub horizon: HorizonBucket,
}

/// Why a candidate was denied, or `None` if allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    None,
    TrustFragile,
    PolicyDenies,
    CategoryBlocked,
    CategoryMismatch,
    HorizonMismatch,
    RateLimited,
}

impl DenyReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TrustFragile => "trust_fragile",
            Self::PolicyDenies => "policy_denies",
            Self::CategoryBlocked => "category_blocked",
            Self::CategoryMismatch => "category_mismatch",
            Self::HorizonMismatch => "horizon_mismatch",
            Self::RateLimited => "rate_limited",
        }
    }
}

/// An immutable, per-candidate outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDecision {
    pub candidate_hash: CandidateHash,
    pub allowed: bool,
    pub reason: DenyReason,
}

/// The full outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResult {
    pub input_hash: String,
    pub status_hash: String,
    pub decisions: Vec<PermissionDecision>,
    pub permitted_bucket: MagnitudeBucket,
    pub denied_bucket: MagnitudeBucket,
}

fn horizon_str(h: HorizonBucket) -> &'static str {
    match h {
        HorizonBucket::Now => "now",
        HorizonBucket::Soon => "soon",
        HorizonBucket::Later => "later",
    }
}

/// Evaluate all candidates against `policy` and the `trust_fragile` global
/// modifier. Cannot fail.
pub fn evaluate(
    candidates: &[InterruptCandidate],
    policy: Option<&InterruptPolicy>,
    trust_fragile: bool,
) -> PermissionResult {
    let input_hash = compute_input_hash(candidates, policy, trust_fragile);

    let mut decisions: Vec<PermissionDecision> = if trust_fragile {
        candidates
            .iter()
            .map(|c| deny(c, DenyReason::TrustFragile))
            .collect()
    } else {
        match policy {
            None => candidates.iter().map(|c| deny(c, DenyReason::PolicyDenies)).collect(),
            Some(p) if p.allowance == Allowance::AllowNone => {
                candidates.iter().map(|c| deny(c, DenyReason::PolicyDenies)).collect()
            }
            Some(p) => candidates.iter().map(|c| evaluate_one(c, p)).collect(),
        }
    };

    apply_rate_limit(&mut decisions, candidates, policy);

    let status_hash = compute_status_hash(&decisions);
    let permitted = decisions.iter().filter(|d| d.allowed).count();
    let denied = decisions.iter().filter(|d| !d.allowed).count();

    PermissionResult {
        input_hash,
        status_hash,
        decisions,
        permitted_bucket: MagnitudeBucket::of(permitted),
        denied_bucket: MagnitudeBucket::of(denied),
    }
}

fn deny(candidate: &InterruptCandidate, reason: DenyReason) -> PermissionDecision {
    PermissionDecision {
        candidate_hash: candidate.candidate_hash.clone(),
        allowed: false,
        reason,
    }
}

fn allow(candidate: &InterruptCandidate) -> PermissionDecision {
    PermissionDecision {
        candidate_hash: candidate.candidate_hash.clone(),
        allowed: true,
        reason: DenyReason::None,
    }
}

/// Commerce-first check, then the allowance-specific category/horizon rule.
fn evaluate_one(candidate: &InterruptCandidate, policy: &InterruptPolicy) -> PermissionDecision {
    if candidate.circle_type == CircleType::Commerce {
        return deny(candidate, DenyReason::CategoryBlocked);
    }
    match policy.allowance {
        Allowance::AllowNone => deny(candidate, DenyReason::PolicyDenies),
        Allowance::AllowHumansNow => {
            if candidate.circle_type != CircleType::Human {
                deny(candidate, DenyReason::CategoryMismatch)
            } else if candidate.horizon != HorizonBucket::Now {
                deny(candidate, DenyReason::HorizonMismatch)
            } else {
                allow(candidate)
            }
        }
        Allowance::AllowInstitutionsSoon => {
            if candidate.circle_type != CircleType::Institution {
                deny(candidate, DenyReason::CategoryMismatch)
            } else if !matches!(candidate.horizon, HorizonBucket::Now | HorizonBucket::Soon) {
                deny(candidate, DenyReason::HorizonMismatch)
            } else {
                allow(candidate)
            }
        }
        Allowance::AllowTwoPerDay => allow(candidate),
    }
}

/// Collect all candidates still marked allowed, sort by candidate hash
/// ascending, keep the first `min(max_per_day, HARD_CAP_PER_DAY)`; deny the
/// rest `rate_limited`.
fn apply_rate_limit(
    decisions: &mut [PermissionDecision],
    candidates: &[InterruptCandidate],
    policy: Option<&InterruptPolicy>,
) {
    let cap = policy
        .map(|p| p.max_per_day.min(HARD_CAP_PER_DAY))
        .unwrap_or(0) as usize;

    let mut eligible_indices: Vec<usize> = decisions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.allowed)
        .map(|(i, _)| i)
        .collect();
    eligible_indices.sort_by(|&a, &b| candidates[a].candidate_hash.to_string().cmp(&candidates[b].candidate_hash.to_string()));

    for &idx in eligible_indices.iter().skip(cap) {
        decisions[idx] = deny(&candidates[idx], DenyReason::RateLimited);
    }
}

fn compute_input_hash(
    candidates: &[InterruptCandidate],
    policy: Option<&InterruptPolicy>,
    trust_fragile: bool,
) -> String {
    let mut hashes: Vec<String> = candidates.iter().map(|c| c.candidate_hash.to_string()).collect();
    hashes.sort();
    let joined_candidates = hashes.join(",");
    let allowance = policy.map(|p| p.allowance.as_str()).unwrap_or("none");
    let max_per_day = policy.map(|p| p.max_per_day.to_string()).unwrap_or_else(|| "0".to_string());
    let fragile = trust_fragile.to_string();
    let canonical = canonical_string(
        CANONICAL_TAG_INPUT,
        CANONICAL_VERSION,
        &[joined_candidates.as_str(), allowance, max_per_day.as_str(), fragile.as_str()],
    );
    quantumlife_core::hashing::full_hash(canonical.as_bytes())
}

fn compute_status_hash(decisions: &[PermissionDecision]) -> String {
    let parts: Vec<String> = decisions
        .iter()
        .map(|d| format!("{}:{}:{}", d.candidate_hash, d.allowed, d.reason.as_str()))
        .collect();
    let joined = parts.join(",");
    let canonical = canonical_string(CANONICAL_TAG_STATUS, CANONICAL_VERSION, &[joined.as_str()]);
    quantumlife_core::hashing::full_hash(canonical.as_bytes())
}
