/// Outcome of an unrecoverable transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverDecision {
    /// Rebind the given index and carry the play intent forward.
    Advance(usize),
    /// Nothing left to rotate to; surface a terminal error.
    Exhausted,
}

/// Round-robin advance over the candidate list. A single-candidate session
/// has nothing to rotate to and fails terminally on the first fatal error.
pub fn on_fatal_error(candidate_count: usize, current_index: usize) -> FailoverDecision {
    if candidate_count <= 1 {
        return FailoverDecision::Exhausted;
    }
    let next = (current_index + 1) % candidate_count;
    if next == current_index {
        return FailoverDecision::Exhausted;
    }
    FailoverDecision::Advance(next)
}

/// Manual skip forward, wrapping modulo the candidate count.
pub fn step_forward(current_index: usize, candidate_count: usize) -> usize {
    (current_index + 1) % candidate_count
}

/// Manual skip backward, wrapping modulo the candidate count.
pub fn step_back(current_index: usize, candidate_count: usize) -> usize {
    (current_index + candidate_count - 1) % candidate_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn advances_round_robin_without_skipping() {
        assert_eq!(on_fatal_error(3, 0), FailoverDecision::Advance(1));
        assert_eq!(on_fatal_error(3, 1), FailoverDecision::Advance(2));
        assert_eq!(on_fatal_error(3, 2), FailoverDecision::Advance(0));
    }

    #[test]
    fn single_or_empty_lists_are_exhausted() {
        assert_eq!(on_fatal_error(1, 0), FailoverDecision::Exhausted);
        assert_eq!(on_fatal_error(0, 0), FailoverDecision::Exhausted);
    }

    #[test]
    fn full_rotation_visits_every_index_once() {
        let mut index = 0;
        let mut visited = vec![0];
        for _ in 0..4 {
            match on_fatal_error(5, index) {
                FailoverDecision::Advance(next) => {
                    index = next;
                    visited.push(next);
                }
                FailoverDecision::Exhausted => unreachable!(),
            }
        }
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn manual_steps_wrap_both_ways() {
        assert_eq!(step_forward(2, 3), 0);
        assert_eq!(step_forward(0, 3), 1);
        assert_eq!(step_back(0, 3), 2);
        assert_eq!(step_back(2, 3), 1);
        assert_eq!(step_forward(0, 1), 0);
        assert_eq!(step_back(0, 1), 0);
    }
}
