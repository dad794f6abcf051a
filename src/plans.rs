use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Identifier for a service plan. Closed set, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Free,
    Standard,
    Custom,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Standard => "standard",
            PlanId::Custom => "custom",
        }
    }

    pub fn all() -> &'static [PlanId] {
        &[PlanId::Free, PlanId::Standard, PlanId::Custom]
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = UnknownPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(PlanId::Free),
            "standard" => Ok(PlanId::Standard),
            "custom" => Ok(PlanId::Custom),
            _ => Err(UnknownPlanError {
                input: s.to_string(),
            }),
        }
    }
}

/// Raised when plan input arrives as an open string (config file, CLI flag)
/// and does not name a known plan. Unknown input is reported to the caller,
/// never defaulted to a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlanError {
    pub input: String,
}

impl fmt::Display for UnknownPlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown plan '{}': expected one of free, standard, custom",
            self.input
        )
    }
}

impl std::error::Error for UnknownPlanError {}

/// A usage limit: a finite count or no limit at all.
///
/// Unbounded is a tagged variant rather than a sentinel number, so it can
/// never leak into arithmetic. It orders strictly above every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Finite(u32),
    Unbounded,
}

impl Limit {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Limit::Unbounded)
    }
}

impl PartialOrd for Limit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Limit {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Limit::Finite(a), Limit::Finite(b)) => a.cmp(b),
            (Limit::Finite(_), Limit::Unbounded) => Ordering::Less,
            (Limit::Unbounded, Limit::Finite(_)) => Ordering::Greater,
            (Limit::Unbounded, Limit::Unbounded) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Finite(n) => write!(f, "{}", n),
            Limit::Unbounded => write!(f, "unlimited"),
        }
    }
}

/// Resource limits attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub modules: Limit,
    pub tenants: Limit,
    pub users: Limit,
}

/// Display name and limits for a single plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDetails {
    pub name: &'static str,
    pub limits: PlanLimits,
}

static FREE: PlanDetails = PlanDetails {
    name: "Free",
    limits: PlanLimits {
        modules: Limit::Finite(3),
        tenants: Limit::Finite(1),
        users: Limit::Finite(5),
    },
};

static STANDARD: PlanDetails = PlanDetails {
    name: "Standard",
    limits: PlanLimits {
        modules: Limit::Finite(10),
        tenants: Limit::Finite(5),
        users: Limit::Finite(50),
    },
};

static CUSTOM: PlanDetails = PlanDetails {
    name: "Custom",
    limits: PlanLimits {
        modules: Limit::Unbounded,
        tenants: Limit::Unbounded,
        users: Limit::Unbounded,
    },
};

/// Resolve a plan identifier to its details. Total over the closed set of
/// identifiers; there is no "not found" path.
pub fn lookup(id: PlanId) -> &'static PlanDetails {
    match id {
        PlanId::Free => &FREE,
        PlanId::Standard => &STANDARD,
        PlanId::Custom => &CUSTOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_plan_resolves() {
        for &id in PlanId::all() {
            let details = lookup(id);
            assert!(!details.name.is_empty());
        }
    }

    #[test]
    fn test_pinned_limits() {
        assert_eq!(lookup(PlanId::Free).limits.users, Limit::Finite(5));
        assert_eq!(lookup(PlanId::Standard).limits.tenants, Limit::Finite(5));
        assert!(lookup(PlanId::Custom).limits.modules.is_unbounded());
    }

    #[test]
    fn test_unbounded_orders_above_every_finite_value() {
        assert!(Limit::Unbounded > Limit::Finite(0));
        assert!(Limit::Unbounded > Limit::Finite(u32::MAX));
        assert_eq!(Limit::Unbounded, Limit::Unbounded);
        assert!(Limit::Finite(4) < Limit::Finite(5));
    }

    #[test]
    fn test_plan_id_from_str() {
        assert_eq!("free".parse::<PlanId>(), Ok(PlanId::Free));
        assert_eq!("Standard".parse::<PlanId>(), Ok(PlanId::Standard));
        assert_eq!("CUSTOM".parse::<PlanId>(), Ok(PlanId::Custom));

        let err = "enterprise".parse::<PlanId>().unwrap_err();
        assert_eq!(err.input, "enterprise");
        assert!(err.to_string().contains("unknown plan 'enterprise'"));
    }

    #[test]
    fn test_plan_id_serde_round_trip() {
        let json = serde_json::to_string(&PlanId::Standard).unwrap();
        assert_eq!(json, "\"standard\"");
        let back: PlanId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlanId::Standard);
    }

    #[test]
    fn test_limits_grow_with_plan_tier() {
        let free = lookup(PlanId::Free).limits;
        let standard = lookup(PlanId::Standard).limits;
        let custom = lookup(PlanId::Custom).limits;

        assert!(free.modules <= standard.modules);
        assert!(standard.modules <= custom.modules);
        assert!(free.users <= standard.users);
        assert!(standard.users <= custom.users);
        assert!(free.tenants <= standard.tenants);
        assert!(standard.tenants <= custom.tenants);
    }
}
