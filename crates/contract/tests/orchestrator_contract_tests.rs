//! The orchestrator's strong-run arguments must satisfy the trainer contract.

use std::path::Path;

use depthcmp_contract::check_defaults;
use depthcmp_core::trainer::{DepthSupervisionArgs, StrongSupervision, TrainerInvocation};

/// Depth flags (and their values) from a full trainer argument list.
fn depth_flags(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--depth_") {
            out.push(arg.clone());
            if let Some(value) = iter.next() {
                out.push(value.clone());
            }
        }
    }
    out
}

#[test]
fn strong_invocation_parses_under_contract() {
    let supervision = StrongSupervision::new("/data/gt_depth");
    let invocation = TrainerInvocation::strong(Path::new("/data/scene"), &supervision, Path::new("/runs"));

    let parsed = DepthSupervisionArgs::try_parse_args(depth_flags(invocation.args())).unwrap();

    assert_eq!(parsed.depth_dir, "/data/gt_depth");
    assert_eq!(parsed.depth_weight, StrongSupervision::DEFAULT_WEIGHT);
    assert_eq!(parsed.depth_grad_weight, StrongSupervision::DEFAULT_GRAD_WEIGHT);
    assert_eq!(parsed.depth_warmup, StrongSupervision::DEFAULT_WARMUP);

    // Options the orchestrator leaves unset fall back to the trainer defaults.
    let defaults = check_defaults().unwrap();
    assert_eq!(parsed.depth_valid_min, defaults.depth_valid_min);
    assert_eq!(parsed.depth_valid_max, defaults.depth_valid_max);
}

#[test]
fn weak_invocation_sets_no_depth_options() {
    let invocation = TrainerInvocation::weak(
        Path::new("/data/scene"),
        Path::new("/data/mono_depth"),
        Path::new("/runs"),
    );
    assert!(depth_flags(invocation.args()).is_empty());
}
