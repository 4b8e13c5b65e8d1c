//! Per-city and global statistics over a validated set of people.

use crate::model::Person;
use crate::summary::{CityTable, FeedSummary};
use crate::{FeedResult, FeedStatsError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Value counts that remember first-seen order, so ties resolve to the
/// value encountered earliest.
#[derive(Debug, Clone)]
pub struct FrequencyCount<T> {
    counts: Vec<(T, u64)>,
    slots: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> FrequencyCount<T> {
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            slots: HashMap::new(),
        }
    }

    pub fn add(&mut self, value: T) {
        match self.slots.get(&value) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(value.clone(), self.counts.len());
                self.counts.push((value, 1));
            }
        }
    }

    pub fn count(&self, value: &T) -> u64 {
        self.slots.get(value).map_or(0, |&slot| self.counts[slot].1)
    }

    /// Highest count; among equal counts the first-seen value wins.
    pub fn most_common(&self) -> Option<(&T, u64)> {
        let mut best: Option<(&T, u64)> = None;
        for (value, count) in &self.counts {
            if best.map_or(true, |(_, top)| *count > top) {
                best = Some((value, *count));
            }
        }
        best
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for FrequencyCount<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for FrequencyCount<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut counter = Self::new();
        for value in iter {
            counter.add(value);
        }
        counter
    }
}

/// city -> (age, friend count) per member, cities in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct CityGroups {
    groups: Vec<(String, Vec<(u64, u64)>)>,
    slots: HashMap<String, usize>,
}

impl CityGroups {
    pub fn from_people(people: &[Person]) -> Self {
        let mut groups = Self::default();
        for person in people {
            groups.push(&person.city, person.age, person.num_friends() as u64);
        }
        groups
    }

    fn push(&mut self, city: &str, age: u64, friends: u64) {
        let slot = match self.slots.get(city) {
            Some(&slot) => slot,
            None => {
                self.slots.insert(city.to_string(), self.groups.len());
                self.groups.push((city.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.push((age, friends));
    }

    pub fn group_sizes(&self) -> Vec<(&str, usize)> {
        self.groups
            .iter()
            .map(|(city, members)| (city.as_str(), members.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn mean_ages(&self) -> CityTable {
        self.means(|(age, _)| age)
    }

    pub fn mean_friends(&self) -> CityTable {
        self.means(|(_, friends)| friends)
    }

    fn means(&self, pick: impl Fn((u64, u64)) -> u64) -> CityTable {
        self.groups
            .iter()
            .map(|(city, members)| {
                let sum: u128 = members.iter().copied().map(&pick).map(u128::from).sum();
                (city.clone(), round_mean(sum, members.len()))
            })
            .collect()
    }
}

/// Mean rounded half-to-even; an empty group has mean 0.
///
/// Integer arithmetic throughout, so the mean of any `u64` values is exact.
pub fn round_mean(sum: u128, n: usize) -> u64 {
    if n == 0 {
        return 0;
    }
    let n = n as u128;
    let (quotient, remainder) = (sum / n, sum % n);
    let rounded = match (remainder * 2).cmp(&n) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient & 1),
    };
    // the mean of u64 values never exceeds u64::MAX
    rounded as u64
}

/// Compute the full summary. Fails on an empty slice, and when no friend of
/// any person lists a hobby.
pub fn aggregate(people: &[Person]) -> FeedResult<FeedSummary> {
    let top = people
        .iter()
        .reduce(|best, p| if p.num_friends() > best.num_friends() { p } else { best })
        .ok_or(FeedStatsError::EmptyFeed)?;

    let groups = CityGroups::from_people(people);
    tracing::debug!(people = people.len(), cities = groups.len(), "grouped people by city");

    let names: FrequencyCount<&str> = people.iter().map(|p| p.name.as_str()).collect();
    let (name, name_count) = names.most_common().ok_or(FeedStatsError::EmptyFeed)?;

    let hobbies: FrequencyCount<&str> = people
        .iter()
        .flat_map(|p| &p.friends)
        .flat_map(|f| &f.hobbies)
        .map(String::as_str)
        .collect();
    tracing::debug!(distinct_hobbies = hobbies.len(), "counted hobbies");
    let (hobby, hobby_count) = hobbies.most_common().ok_or(FeedStatsError::NoHobbies)?;

    Ok(FeedSummary {
        average_age_per_city: groups.mean_ages(),
        average_friends_per_city: groups.mean_friends(),
        person_with_most_friends: top.name.clone(),
        most_friends_count: top.num_friends() as u64,
        most_common_name_count: name_count,
        most_common_name_all_cities: name.to_string(),
        most_common_hobby: hobby.to_string(),
        most_common_hobby_count: hobby_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Friend;
    use serde_json::json;

    fn person(name: &str, city: &str, age: u64, friends: &[&[&str]]) -> Person {
        Person {
            id: json!(name),
            name: name.to_string(),
            city: city.to_string(),
            age,
            friends: friends
                .iter()
                .map(|hobbies| Friend {
                    hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn frequency_ties_go_to_first_seen() {
        let counts: FrequencyCount<&str> = ["b", "a", "a", "b", "c"].into_iter().collect();
        assert_eq!(counts.most_common(), Some((&"b", 2)));
        assert_eq!(counts.count(&"a"), 2);
        assert_eq!(counts.count(&"z"), 0);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn later_value_wins_only_with_strictly_more() {
        let counts: FrequencyCount<&str> = ["a", "b", "b"].into_iter().collect();
        assert_eq!(counts.most_common(), Some((&"b", 2)));
        assert!(FrequencyCount::<&str>::new().most_common().is_none());
    }

    #[test]
    fn round_mean_is_half_to_even() {
        assert_eq!(round_mean(1, 2), 0);
        assert_eq!(round_mean(3, 2), 2);
        assert_eq!(round_mean(5, 2), 2);
        assert_eq!(round_mean(10, 3), 3);
        assert_eq!(round_mean(0, 0), 0);
        assert_eq!(round_mean(7, 2), 4);
    }

    #[test]
    fn huge_ages_in_one_city_do_not_overflow() {
        let age = u64::MAX / 2 + 1;
        let people = vec![
            person("a", "X", age, &[&["chess"]]),
            person("b", "X", age, &[]),
            person("c", "Y", u64::MAX, &[]),
            person("d", "Y", u64::MAX - 1, &[]),
        ];
        let summary = aggregate(&people).unwrap();
        assert_eq!(summary.average_age_per_city.get("X"), Some(age));
        // (2^64 - 1 + 2^64 - 2) / 2 = 2^64 - 1.5, ties to even
        assert_eq!(summary.average_age_per_city.get("Y"), Some(u64::MAX - 1));
        assert_eq!(round_mean(u128::from(u64::MAX) * 3, 3), u64::MAX);
    }

    #[test]
    fn three_person_scenario() {
        let people = vec![
            person("p1", "X", 10, &[&["chess"]]),
            person("p2", "X", 20, &[]),
            person("p3", "Y", 30, &[&["chess", "golf"]]),
        ];
        let summary = aggregate(&people).unwrap();
        assert_eq!(summary.average_age_per_city.get("X"), Some(15));
        assert_eq!(summary.average_age_per_city.get("Y"), Some(30));
        // X has (1 + 0) / 2 = 0.5 friends, which rounds to even
        assert_eq!(summary.average_friends_per_city.get("X"), Some(0));
        assert_eq!(summary.average_friends_per_city.get("Y"), Some(1));
        assert_eq!(summary.most_common_hobby, "chess");
        assert_eq!(summary.most_common_hobby_count, 2);
        assert_eq!(summary.person_with_most_friends, "p1");
        assert_eq!(summary.most_friends_count, 1);
    }

    #[test]
    fn most_friends_tie_goes_to_first_person() {
        let people = vec![
            person("first", "X", 1, &[&["a"], &["b"]]),
            person("second", "Y", 1, &[&["c"], &["d"]]),
        ];
        let summary = aggregate(&people).unwrap();
        assert_eq!(summary.person_with_most_friends, "first");
        assert_eq!(summary.most_friends_count, 2);
    }

    #[test]
    fn most_common_name_counts_across_cities() {
        let people = vec![
            person("Ann", "X", 1, &[&["a"]]),
            person("Bob", "Y", 1, &[]),
            person("Bob", "Z", 1, &[]),
            person("Ann", "Z", 1, &[]),
        ];
        let summary = aggregate(&people).unwrap();
        assert_eq!(summary.most_common_name_all_cities, "Ann");
        assert_eq!(summary.most_common_name_count, 2);
        let cities: Vec<&str> = summary.average_age_per_city.cities().collect();
        assert_eq!(cities, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn no_hobbies_anywhere_is_an_error() {
        let people = vec![person("a", "X", 1, &[]), person("b", "X", 2, &[&[]])];
        assert!(matches!(aggregate(&people), Err(FeedStatsError::NoHobbies)));
    }

    #[test]
    fn empty_people_is_an_error() {
        assert!(matches!(aggregate(&[]), Err(FeedStatsError::EmptyFeed)));
    }

    #[test]
    fn group_sizes_cover_every_person() {
        let people = vec![
            person("a", "X", 1, &[]),
            person("b", "Y", 2, &[]),
            person("c", "X", 3, &[]),
        ];
        let groups = CityGroups::from_people(&people);
        assert_eq!(groups.group_sizes(), vec![("X", 2), ("Y", 1)]);
    }
}
