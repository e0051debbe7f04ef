use std::collections::HashMap;

use aria::kernel::policy::{GateDecision, RiskTier, SecurityMode, TrustPolicy};
use aria::nlu::catalog::{Catalog, IntentCategory};

fn policy() -> TrustPolicy {
    TrustPolicy::new(&Catalog::builtin(), HashMap::new())
}

#[test]
fn test_full_gate_matrix() {
    use GateDecision::*;
    use RiskTier::*;
    use SecurityMode::*;

    let policy = policy();
    let expected = [
        (Safe, Strict, Proceed),
        (Safe, Trust, Proceed),
        (Safe, Full, Proceed),
        (Caution, Strict, NeedsConfirmation),
        (Caution, Trust, Proceed),
        (Caution, Full, Proceed),
        (Restricted, Strict, Refused),
        (Restricted, Trust, NeedsConfirmation),
        (Restricted, Full, Proceed),
    ];

    for (tier, mode, want) in expected {
        assert_eq!(
            policy.evaluate(tier, mode),
            want,
            "gate({:?}, {:?}) should be {:?}",
            tier,
            mode,
            want
        );
    }
}

#[test]
fn test_loosening_the_mode_never_tightens_a_decision() {
    // Ordered loosest to strictest per decision: Proceed < NeedsConfirmation
    // < Refused. Walking Strict -> Trust -> Full must never move right.
    fn strictness(d: GateDecision) -> u8 {
        match d {
            GateDecision::Proceed => 0,
            GateDecision::NeedsConfirmation => 1,
            GateDecision::Refused => 2,
        }
    }

    let policy = policy();
    for tier in [RiskTier::Safe, RiskTier::Caution, RiskTier::Restricted] {
        let strict = strictness(policy.evaluate(tier, SecurityMode::Strict));
        let trust = strictness(policy.evaluate(tier, SecurityMode::Trust));
        let full = strictness(policy.evaluate(tier, SecurityMode::Full));
        assert!(
            strict >= trust && trust >= full,
            "gate must be monotone in the mode for {:?}",
            tier
        );
    }
}

#[test]
fn test_catalog_defaults_are_looked_up() {
    let policy = policy();
    assert_eq!(policy.tier_for(IntentCategory::VolumeControl), RiskTier::Safe);
    assert_eq!(policy.tier_for(IntentCategory::AppClose), RiskTier::Caution);
    assert_eq!(policy.tier_for(IntentCategory::FileDelete), RiskTier::Restricted);
    assert_eq!(
        policy.tier_for(IntentCategory::SystemShutdown),
        RiskTier::Restricted
    );
}

#[test]
fn test_overrides_replace_catalog_defaults() {
    let mut overrides = HashMap::new();
    overrides.insert(IntentCategory::AppClose, RiskTier::Safe);
    let policy = TrustPolicy::new(&Catalog::builtin(), overrides);

    assert_eq!(policy.tier_for(IntentCategory::AppClose), RiskTier::Safe);
    // Untouched categories keep their defaults.
    assert_eq!(policy.tier_for(IntentCategory::FileDelete), RiskTier::Restricted);
}

#[test]
fn test_uncataloged_category_is_treated_as_restricted() {
    let policy = policy();
    assert_eq!(
        policy.tier_for(IntentCategory::Unknown),
        RiskTier::Restricted,
        "anything without a tier must get the most conservative one"
    );
}
