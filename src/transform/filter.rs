use log::info;
use std::collections::HashMap;
use std::hash::Hash;

use super::types::RatingRecord;

/// Keep ratings from users with at least `min_ratings_per_user` ratings
pub fn filter_active_users(
    ratings: Vec<RatingRecord>,
    min_ratings_per_user: usize,
) -> Vec<RatingRecord> {
    let before = ratings.len();
    let kept = retain_frequent(ratings, min_ratings_per_user, |r| r.user_id);
    info!(
        "Active users filter (>= {} ratings): {} -> {} ratings",
        min_ratings_per_user,
        before,
        kept.len()
    );
    kept
}

/// Keep ratings of books with at least `min_ratings_per_book` ratings.
///
/// Counts are taken over the table passed in, which in the training
/// pipeline is the output of [`filter_active_users`].
pub fn filter_popular_books(
    ratings: Vec<RatingRecord>,
    min_ratings_per_book: usize,
) -> Vec<RatingRecord> {
    let before = ratings.len();
    let kept = retain_frequent(ratings, min_ratings_per_book, |r| r.isbn.clone());
    info!(
        "Popular books filter (>= {} ratings): {} -> {} ratings",
        min_ratings_per_book,
        before,
        kept.len()
    );
    kept
}

fn retain_frequent<K, F>(mut ratings: Vec<RatingRecord>, threshold: usize, key: F) -> Vec<RatingRecord>
where
    K: Eq + Hash,
    F: Fn(&RatingRecord) -> K,
{
    let counts = count_by(&ratings, &key);
    ratings.retain(|r| counts.get(&key(r)).copied().unwrap_or(0) >= threshold);
    ratings
}

fn count_by<K, F>(ratings: &[RatingRecord], key: F) -> HashMap<K, usize>
where
    K: Eq + Hash,
    F: Fn(&RatingRecord) -> K,
{
    let mut counts = HashMap::new();
    for rating in ratings {
        *counts.entry(key(rating)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rating(user_id: i64, isbn: &str) -> RatingRecord {
        RatingRecord {
            user_id,
            isbn: isbn.to_string(),
            rating: 5.0,
        }
    }

    fn distinct_books(ratings: &[RatingRecord]) -> usize {
        ratings.iter().map(|r| r.isbn.as_str()).collect::<HashSet<_>>().len()
    }

    #[test]
    fn test_user_threshold_is_inclusive() {
        let ratings = vec![rating(1, "A"), rating(1, "B"), rating(2, "A")];
        let kept = filter_active_users(ratings, 2);
        assert_eq!(kept, vec![rating(1, "A"), rating(1, "B")]);
    }

    #[test]
    fn test_book_threshold_is_inclusive() {
        let ratings = vec![rating(1, "A"), rating(2, "A"), rating(3, "B")];
        let kept = filter_popular_books(ratings, 2);
        assert_eq!(kept, vec![rating(1, "A"), rating(2, "A")]);
    }

    #[test]
    fn test_filters_preserve_row_order() {
        let ratings = vec![rating(2, "B"), rating(1, "A"), rating(2, "A"), rating(1, "B")];
        let kept = filter_active_users(ratings.clone(), 1);
        assert_eq!(kept, ratings);
    }

    #[test]
    fn test_filter_order_changes_the_result() {
        // user 1 rates A and B, user 2 only A, user 3 rates B and C
        let ratings = vec![
            rating(1, "A"),
            rating(1, "B"),
            rating(2, "A"),
            rating(3, "B"),
            rating(3, "C"),
        ];

        let users_first = filter_popular_books(filter_active_users(ratings.clone(), 2), 2);
        let books_first = filter_active_users(filter_popular_books(ratings, 2), 2);

        assert_eq!(users_first, vec![rating(1, "B"), rating(3, "B")]);
        assert_eq!(books_first, vec![rating(1, "A"), rating(1, "B")]);
        assert_ne!(distinct_books(&users_first), distinct_books(&books_first));
    }
}
