use feed_stats::{aggregate, round_mean, CityGroups, Friend, Person};
use proptest::prelude::*;
use serde_json::json;

fn arb_person() -> impl Strategy<Value = Person> {
    (
        0_u64..1000,
        prop::sample::select(vec!["Ann", "Bob", "Cy"]),
        prop::sample::select(vec!["X", "Y", "Z"]),
        0_u64..100,
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!["chess", "golf", "yoga"]), 0..3),
            0..4,
        ),
    )
        .prop_map(|(id, name, city, age, friends)| Person {
            id: json!(id),
            name: name.to_string(),
            city: city.to_string(),
            age,
            friends: friends
                .into_iter()
                .map(|hobbies| Friend {
                    hobbies: hobbies.into_iter().map(str::to_string).collect(),
                })
                .collect(),
        })
}

fn with_a_hobby(mut people: Vec<Person>) -> Vec<Person> {
    people[0].friends.push(Friend {
        hobbies: vec!["chess".to_string()],
    });
    people
}

proptest! {
    #[test]
    fn group_sizes_sum_to_record_count(people in prop::collection::vec(arb_person(), 1..40)) {
        let groups = CityGroups::from_people(&people);
        let total: usize = groups.group_sizes().iter().map(|(_, n)| n).sum();
        prop_assert_eq!(total, people.len());
    }

    #[test]
    fn city_average_ignores_other_cities(
        people in prop::collection::vec(arb_person(), 1..40),
        shift in 1_u64..50,
    ) {
        let people = with_a_hobby(people);
        let before = aggregate(&people).unwrap();

        let mut changed = people.clone();
        for p in changed.iter_mut().filter(|p| p.city != "X") {
            p.age += shift;
        }
        let after = aggregate(&changed).unwrap();
        prop_assert_eq!(
            before.average_age_per_city.get("X"),
            after.average_age_per_city.get("X")
        );

        let x_ages: Vec<u64> = people.iter().filter(|p| p.city == "X").map(|p| p.age).collect();
        if !x_ages.is_empty() {
            prop_assert_eq!(
                before.average_age_per_city.get("X"),
                Some(round_mean(x_ages.iter().map(|&a| u128::from(a)).sum(), x_ages.len()))
            );
        }
    }

    #[test]
    fn aggregation_is_idempotent(people in prop::collection::vec(arb_person(), 1..40)) {
        let people = with_a_hobby(people);
        let first = aggregate(&people).unwrap();
        let second = aggregate(&people).unwrap();
        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        prop_assert_eq!(first, second);
    }
}
