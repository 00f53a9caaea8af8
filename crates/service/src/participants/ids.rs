use std::collections::HashSet;

use models::Participant;

use crate::errors::ServiceError;

/// Pick the id for a new participant.
///
/// Ids grow monotonically: the result is `max + 1` (an empty roster yields 1).
/// Only when the maximum id is `u32::MAX` are gaps reused, scanning upward
/// from 0 for the first free value.
pub fn next_id(roster: &[Participant]) -> Result<u32, ServiceError> {
    let max = roster.iter().map(|p| p.id).max().unwrap_or(0);
    if max != u32::MAX {
        return Ok(max + 1);
    }

    let used: HashSet<u32> = roster.iter().map(|p| p.id).collect();
    (0..u32::MAX)
        .find(|id| !used.contains(id))
        .ok_or(ServiceError::IdSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[u32]) -> Vec<Participant> {
        ids.iter()
            .map(|&id| Participant { id, name: format!("p{id}"), score: 0 })
            .collect()
    }

    #[test]
    fn empty_roster_starts_at_one() {
        assert_eq!(next_id(&[]).unwrap(), 1);
    }

    #[test]
    fn follows_the_maximum() {
        assert_eq!(next_id(&roster(&[0, 1, 2])).unwrap(), 3);
        assert_eq!(next_id(&roster(&[0])).unwrap(), 1);
        // low gaps are not reused while the top of the space is free
        assert_eq!(next_id(&roster(&[9, 2, 5])).unwrap(), 10);
    }

    #[test]
    fn saturated_top_reuses_first_gap() {
        assert_eq!(next_id(&roster(&[u32::MAX])).unwrap(), 0);
        assert_eq!(next_id(&roster(&[0, 1, u32::MAX, 3])).unwrap(), 2);
    }
}
