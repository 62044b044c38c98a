//! Derivation of the ordered command sequence for a grant
//!
//! The sequence is fixed: membership tier first, then the dependent grants.
//! Some deployments gate the grant commands on tier membership, so the order
//! is load-bearing and the orchestrator never reorders or parallelizes it.

use serde::{Deserialize, Serialize};

use crate::types::{GrantRequest, RankDefinition};

/// What a command in the sequence does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Set the player's membership tier
    SetTier,
    /// Grant the rank's currency amount
    GrantCurrency,
    /// Grant the rank's claim-block allotment
    GrantClaimBlocks,
}

/// One command in a grant's ordered sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantCommand {
    /// 1-based position in the sequence
    pub step: usize,
    pub kind: CommandKind,
    /// The exact line sent to the console
    pub line: String,
}

/// Build the ordered command sequence for a grant
pub fn command_sequence(request: &GrantRequest, definition: &RankDefinition) -> Vec<GrantCommand> {
    vec![
        GrantCommand {
            step: 1,
            kind: CommandKind::SetTier,
            line: format!("lp user {} parent set {}", request.player, request.rank),
        },
        GrantCommand {
            step: 2,
            kind: CommandKind::GrantCurrency,
            line: format!("eco give {} {}", request.player, definition.cash),
        },
        GrantCommand {
            step: 3,
            kind: CommandKind::GrantClaimBlocks,
            line: format!("acb {} {}", request.player, definition.claim_blocks),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    #[test]
    fn test_sequence_order_and_lines() {
        let request = GrantRequest::new("Alice", Rank::Vip);
        let definition = RankDefinition::new(Rank::Vip, 5_000, 200);

        let plan = command_sequence(&request, &definition);
        let lines: Vec<&str> = plan.iter().map(|c| c.line.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "lp user Alice parent set vip",
                "eco give Alice 5000",
                "acb Alice 200",
            ]
        );
        assert_eq!(plan[0].kind, CommandKind::SetTier);
        assert_eq!(plan[1].kind, CommandKind::GrantCurrency);
        assert_eq!(plan[2].kind, CommandKind::GrantClaimBlocks);
    }

    #[test]
    fn test_steps_are_one_based_and_sequential() {
        let request = GrantRequest::new("Bob", Rank::MvpPlusPlus);
        let definition = RankDefinition::new(Rank::MvpPlusPlus, 12_000, 800);

        let plan = command_sequence(&request, &definition);
        let steps: Vec<usize> = plan.iter().map(|c| c.step).collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_wire_name_appears_in_tier_command() {
        let request = GrantRequest::new("Bob", Rank::MvpPlusPlus);
        let definition = RankDefinition::new(Rank::MvpPlusPlus, 12_000, 800);

        let plan = command_sequence(&request, &definition);
        assert_eq!(plan[0].line, "lp user Bob parent set mvp++");
    }
}
