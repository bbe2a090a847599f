mod common;

use products_hr::{Employee, EmployeeRepository, NewEmployee};

fn new_employee(name: &str, email: &str) -> NewEmployee {
    NewEmployee {
        name: name.into(),
        email: email.into(),
        role: None,
    }
}

#[tokio::test]
async fn insert_assigns_sequential_ids() {
    let repo = common::repository().await;
    let first = repo.insert(new_employee("Ann", "ann@x.com")).await.unwrap();
    let second = repo.insert(new_employee("Bob", "bob@x.com")).await.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(repo.find_by_id(2).await.unwrap(), Some(second));
}

#[tokio::test]
async fn name_prefix_is_case_insensitive() {
    let repo = common::repository().await;
    for (name, email) in [
        ("John", "john@x.com"),
        ("Bjorn", "bjorn@x.com"),
        ("JOE", "joe@x.com"),
        ("joanna", "joanna@x.com"),
        ("Mary", "mary@x.com"),
        ("Émile", "emile@x.com"),
    ] {
        repo.insert(new_employee(name, email)).await.unwrap();
    }

    let names: Vec<String> = repo
        .find_by_name_starting_with_ignore_case("jo")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["John", "JOE", "joanna"]);

    let upper = repo
        .find_by_name_starting_with_ignore_case("JO")
        .await
        .unwrap();
    assert_eq!(upper.len(), 3);

    for prefix in ["É", "Ém", "ÉMI"] {
        let hits = repo
            .find_by_name_starting_with_ignore_case(prefix)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1, "prefix {prefix}");
        assert_eq!(hits[0].name, "Émile");
    }
}

#[tokio::test]
async fn name_prefix_treats_wildcards_literally() {
    let repo = common::repository().await;
    repo.insert(new_employee("50% Club", "club@x.com")).await.unwrap();
    repo.insert(new_employee("500 Miles", "miles@x.com")).await.unwrap();

    let hits = repo
        .find_by_name_starting_with_ignore_case("50%")
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "50% Club");

    let none = repo
        .find_by_name_starting_with_ignore_case("_")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn email_lookup_is_exact() {
    let repo = common::repository().await;
    repo.insert(new_employee("Ann", "ann@x.com")).await.unwrap();

    assert!(repo.find_by_email("ann@x.com").await.unwrap().is_some());
    assert!(repo.find_by_email("ann@x.co").await.unwrap().is_none());
    assert!(repo.find_by_email("nobody@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() {
    let repo = common::repository().await;
    let ghost = Employee {
        id: 42,
        name: "Ghost".into(),
        email: "ghost@x.com".into(),
        role: None,
    };
    assert_eq!(repo.update(ghost).await.unwrap(), None);
    assert!(!repo.delete_by_id(42).await.unwrap());
    assert!(repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_overwrites_fields_in_place() {
    let repo = common::repository().await;
    let mut ann = repo.insert(new_employee("Ann", "ann@x.com")).await.unwrap();
    ann.name = "Annie".into();
    ann.role = Some("burglar".into());

    let updated = repo.update(ann.clone()).await.unwrap().unwrap();
    assert_eq!(updated, ann);
    assert_eq!(repo.find_all().await.unwrap(), vec![ann]);
}
