//! Service layer over the in-memory repository.

use chrono::NaiveDate;
use shift_planner::db::repository::{OrganizationRepository, RepositoryError, ShiftFilter};
use shift_planner::db::services;
use shift_planner::models::*;

mod support;

use support::{dt, Fixture};

fn may(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, day).unwrap()
}

#[tokio::test]
async fn test_create_shift_and_summarize() {
    let fx = Fixture::new().await;
    let contact = fx.contact("Dana").await;
    let mut new_shift = fx.shift(dt(5, 1, 22, 0), dt(5, 2, 8, 0));
    new_shift.shift_contact_id = Some(contact.id);

    let shift = services::create_shift(&fx.repo, new_shift).await.unwrap();
    services::sign_up(&fx.repo, fx.account.id, shift.id).await.unwrap();

    let summary = services::shift_summary(&fx.repo, shift.id, &DisplayFormat::default())
        .await
        .unwrap();
    assert_eq!(summary.shift_id, shift.id);
    assert_eq!(summary.helper_count, 1);
    assert_eq!(summary.slots, 4);
    assert_eq!(summary.task_name, "Translation");
    assert_eq!(summary.facility_name, "Central Station");
    assert_eq!(summary.span_in_days, 1);
    assert_eq!(summary.duration_minutes, 10 * 60);
    assert_eq!(summary.display_ending_time, "08:00 the next day");
    assert_eq!(
        summary.description,
        "Translation - Central Station (2023-05-01 22:00 - 2023-05-02 08:00)"
    );
    assert_eq!(summary.url, format!("/shifts/{}/2023/5/1/", fx.facility.id));
    assert_eq!(summary.contact, Some(contact));
}

#[tokio::test]
async fn test_summary_uses_configured_display_format() {
    let fx = Fixture::new().await;
    let shift = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 30)))
        .await
        .unwrap();
    let format = DisplayFormat::new("%H.%M", "%d.%m.%Y %H.%M").unwrap();

    let summary = services::shift_summary(&fx.repo, shift.id, &format).await.unwrap();
    assert_eq!(summary.display_ending_time, "17.30");
    assert!(summary.description.contains("01.05.2023 09.00"));
}

#[tokio::test]
async fn test_summary_falls_back_to_facility_contact() {
    let fx = Fixture::new().await;
    let desk = fx.contact("Desk").await;
    let facility = services::create_facility(
        &fx.repo,
        NewFacility {
            name: "Harbour".to_string(),
            description: String::new(),
            shift_contact_id: Some(desk.id),
        },
    )
    .await
    .unwrap();
    let task = services::create_task(
        &fx.repo,
        NewTask {
            facility_id: facility.id,
            workplace_id: None,
            name: "Logistics".to_string(),
            description: String::new(),
            shift_contact_id: None,
        },
    )
    .await
    .unwrap();
    let mut new_shift = fx.shift(dt(5, 3, 9, 0), dt(5, 3, 12, 0));
    new_shift.facility_id = facility.id;
    new_shift.task_id = task.id;
    let shift = services::create_shift(&fx.repo, new_shift).await.unwrap();

    let summary = services::shift_summary(&fx.repo, shift.id, &DisplayFormat::default())
        .await
        .unwrap();
    assert_eq!(summary.contact, Some(desk));
}

#[tokio::test]
async fn test_sign_up_twice_propagates_unique_violation() {
    let fx = Fixture::new().await;
    let shift = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0)))
        .await
        .unwrap();

    services::sign_up(&fx.repo, fx.account.id, shift.id).await.unwrap();
    let err = services::sign_up(&fx.repo, fx.account.id, shift.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueViolation { .. }));
}

#[tokio::test]
async fn test_withdraw_reports_whether_anything_changed() {
    let fx = Fixture::new().await;
    let shift = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0)))
        .await
        .unwrap();

    assert!(!services::withdraw(&fx.repo, fx.account.id, shift.id).await.unwrap());
    services::sign_up(&fx.repo, fx.account.id, shift.id).await.unwrap();
    assert!(services::withdraw(&fx.repo, fx.account.id, shift.id).await.unwrap());
    assert!(services::shift_helpers(&fx.repo, shift.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_shift_helpers_and_shifts_for_user() {
    let fx = Fixture::new().await;
    let bob = fx.account("bob").await;
    let late = services::create_shift(&fx.repo, fx.shift(dt(5, 2, 9, 0), dt(5, 2, 17, 0)))
        .await
        .unwrap();
    let early = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0)))
        .await
        .unwrap();

    services::sign_up(&fx.repo, bob.id, late.id).await.unwrap();
    services::sign_up(&fx.repo, fx.account.id, late.id).await.unwrap();
    services::sign_up(&fx.repo, bob.id, early.id).await.unwrap();

    let helpers = services::shift_helpers(&fx.repo, late.id).await.unwrap();
    let described: Vec<String> = helpers.iter().map(|h| h.describe()).collect();
    assert_eq!(described, vec!["bob on Translation", "alice on Translation"]);

    let shifts = services::shifts_for_user(&fx.repo, bob.id).await.unwrap();
    let ids: Vec<ShiftId> = shifts.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[tokio::test]
async fn test_open_shifts_excludes_ended_ones() {
    let fx = Fixture::new().await;
    let past = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 12, 0)))
        .await
        .unwrap();
    let running = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 10, 0), dt(5, 1, 18, 0)))
        .await
        .unwrap();

    let open = services::open_shifts(&fx.repo, dt(5, 1, 13, 0)).await.unwrap();
    let ids: Vec<ShiftId> = open.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![running.id]);
    assert!(!ids.contains(&past.id));
}

#[tokio::test]
async fn test_planner_day_lists_overlapping_shifts_of_one_facility() {
    let fx = Fixture::new().await;
    let overnight = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 22, 0), dt(5, 2, 6, 0)))
        .await
        .unwrap();
    let day = services::create_shift(&fx.repo, fx.shift(dt(5, 2, 9, 0), dt(5, 2, 17, 0)))
        .await
        .unwrap();
    services::create_shift(&fx.repo, fx.shift(dt(5, 3, 9, 0), dt(5, 3, 17, 0)))
        .await
        .unwrap();

    let planner = services::planner_day(&fx.repo, fx.facility.id, may(2), &DisplayFormat::default())
        .await
        .unwrap();
    assert_eq!(planner.facility_name, "Central Station");
    assert_eq!(planner.date, may(2));
    let ids: Vec<ShiftId> = planner.shifts.iter().map(|s| s.shift_id).collect();
    assert_eq!(ids, vec![overnight.id, day.id]);

    let planned = services::planner_shifts(&fx.repo, fx.facility.id, may(2)).await.unwrap();
    assert_eq!(planned.len(), 2);
}

#[tokio::test]
async fn test_planner_day_for_unknown_facility_is_not_found() {
    let fx = Fixture::new().await;
    let err = services::planner_day(
        &fx.repo,
        FacilityId::new(9999),
        may(1),
        &DisplayFormat::default(),
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_canonical_url_leads_to_a_planner_listing_the_shift() {
    let fx = Fixture::new().await;
    let shift = services::create_shift(&fx.repo, fx.shift(dt(5, 7, 9, 0), dt(5, 7, 11, 0)))
        .await
        .unwrap();

    let url = shift.canonical_url();
    let planner = services::planner_day(
        &fx.repo,
        shift.facility_id,
        shift.starting_date(),
        &DisplayFormat::default(),
    )
    .await
    .unwrap();
    assert!(planner.shifts.iter().any(|s| s.shift_id == shift.id && s.url == url));
}

#[tokio::test]
async fn test_delete_and_update_shift() {
    let fx = Fixture::new().await;
    let mut shift = services::create_shift(&fx.repo, fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0)))
        .await
        .unwrap();

    shift.slots = 0;
    let updated = services::update_shift(&fx.repo, shift.clone()).await.unwrap();
    assert_eq!(updated.slots, 0);

    assert!(services::delete_shift(&fx.repo, shift.id).await.unwrap());
    assert!(!services::delete_shift(&fx.repo, shift.id).await.unwrap());
    assert!(services::list_shifts(&fx.repo, &ShiftFilter::all())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_create_organization_records() {
    let fx = Fixture::new().await;
    let contact = services::create_contact(
        &fx.repo,
        NewContactPerson {
            name: "Erin".to_string(),
            email: String::new(),
            phone: "+49 30 1234".to_string(),
        },
    )
    .await
    .unwrap();
    let workplace = services::create_workplace(
        &fx.repo,
        NewWorkplace {
            facility_id: fx.facility.id,
            name: "Info desk".to_string(),
            description: String::new(),
            shift_contact_id: Some(contact.id),
        },
    )
    .await
    .unwrap();
    let account = services::create_user_account(
        &fx.repo,
        NewUserAccount {
            username: "frank".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(fx.repo.get_contact(contact.id).await.unwrap(), contact);
    assert_eq!(fx.repo.get_workplace(workplace.id).await.unwrap(), workplace);
    assert_eq!(fx.repo.get_user_account(account.id).await.unwrap(), account);
    assert!(services::health_check(&fx.repo).await.unwrap());
}

#[tokio::test]
async fn test_services_accept_trait_objects() {
    use shift_planner::db::FullRepository;
    use std::sync::Arc;

    let fx = Fixture::new().await;
    let repo: Arc<dyn FullRepository> = Arc::new(fx.repo.clone());
    let shift = services::create_shift(repo.as_ref(), fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0)))
        .await
        .unwrap();
    assert_eq!(fx.repo.shift_count(), 1);
    assert!(services::get_shift_detail(repo.as_ref(), shift.id).await.is_ok());
}
