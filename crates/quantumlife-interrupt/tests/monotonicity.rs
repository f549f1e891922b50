//! Property test: tightening policy never increases the permitted bucket.

use proptest::prelude::*;

use quantumlife_core::buckets::{HorizonBucket, MagnitudeBucket};
use quantumlife_core::ids::CandidateHash;
use quantumlife_interrupt::{evaluate, Allowance, CircleType, InterruptCandidate, InterruptPolicy};

fn bucket_rank(bucket: MagnitudeBucket) -> u8 {
    match bucket {
        MagnitudeBucket::Nothing => 0,
        MagnitudeBucket::AFew => 1,
        MagnitudeBucket::Several => 2,
    }
}

fn candidate_count_strategy() -> impl Strategy<Value = usize> {
    1usize..8
}

proptest! {
    #[test]
    fn tightening_policy_never_increases_permitted_bucket(count in candidate_count_strategy()) {
        let candidates: Vec<InterruptCandidate> = (0..count)
            .map(|i| InterruptCandidate {
                candidate_hash: CandidateHash::from(format!("cand-{i:02}")),
                circle_type: CircleType::Human,
                horizon: HorizonBucket::Now,
            })
            .collect();

        let loose = InterruptPolicy { allowance: Allowance::AllowTwoPerDay, max_per_day: 2 };
        let medium = InterruptPolicy { allowance: Allowance::AllowHumansNow, max_per_day: 2 };
        let tight = InterruptPolicy { allowance: Allowance::AllowNone, max_per_day: 2 };

        let loose_result = evaluate(&candidates, Some(&loose), false);
        let medium_result = evaluate(&candidates, Some(&medium), false);
        let tight_result = evaluate(&candidates, Some(&tight), false);

        prop_assert!(bucket_rank(medium_result.permitted_bucket) <= bucket_rank(loose_result.permitted_bucket));
        prop_assert!(bucket_rank(tight_result.permitted_bucket) <= bucket_rank(medium_result.permitted_bucket));
    }
}
