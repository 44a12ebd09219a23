use crate::domain::model::Collaboration;

pub const DEFAULT_TOP_K: usize = 5;

/// The `k` highest counts, descending. `sort_by` is stable, so equal counts
/// keep their first-seen order.
pub fn top_k<'a, I>(collaborations: I, k: usize) -> Vec<&'a Collaboration>
where
    I: IntoIterator<Item = &'a Collaboration>,
{
    let mut ranked: Vec<&Collaboration> = collaborations.into_iter().collect();
    ranked.sort_by(|x, y| y.count.cmp(&x.count));
    ranked.truncate(k);
    ranked
}

/// Highest count wins, the earliest entry on ties.
pub fn most_collaborated(collaborations: &[Collaboration]) -> Option<&Collaboration> {
    top_k(collaborations, 1).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collab(name: &str, count: u32) -> Collaboration {
        Collaboration {
            name: name.to_string(),
            pid: None,
            count,
        }
    }

    fn names(ranked: &[&Collaboration]) -> Vec<String> {
        ranked.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_top_k_sorts_descending_and_truncates() {
        let list = vec![
            collab("A", 1),
            collab("B", 7),
            collab("C", 3),
            collab("D", 9),
            collab("E", 2),
            collab("F", 5),
        ];
        let ranked = top_k(&list, 5);
        assert_eq!(names(&ranked), vec!["D", "B", "F", "C", "E"]);
    }

    #[test]
    fn test_top_k_returns_min_of_k_and_n() {
        let list = vec![collab("A", 1), collab("B", 2)];
        assert_eq!(top_k(&list, 5).len(), 2);
        assert_eq!(top_k(&list, 1).len(), 1);
        assert!(top_k(&list, 0).is_empty());
        assert!(top_k(&[], 5).is_empty());
    }

    #[test]
    fn test_top_k_is_stable_on_ties() {
        let list = vec![
            collab("first", 2),
            collab("bigger", 4),
            collab("second", 2),
            collab("third", 2),
        ];
        let ranked = top_k(&list, 3);
        assert_eq!(names(&ranked), vec!["bigger", "first", "second"]);
    }

    #[test]
    fn test_most_collaborated_prefers_first_seen() {
        let list = vec![collab("X", 3), collab("Y", 3)];
        assert_eq!(most_collaborated(&list).unwrap().name, "X");
        assert!(most_collaborated(&[]).is_none());
    }
}
