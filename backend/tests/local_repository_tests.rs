//! Behaviour of the in-memory repository: sign-up uniqueness, cascades,
//! filters and ordering.

use std::sync::Arc;

use chrono::NaiveDate;
use shift_planner::db::repository::*;
use shift_planner::models::*;

mod support;

use support::{dt, Fixture};

// =========================================================
// Sign-up uniqueness
// =========================================================

#[tokio::test]
async fn test_second_sign_up_is_a_unique_violation() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();

    let helper = fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();
    assert_eq!(helper.shift_id, shift.id);
    assert_eq!(helper.user_account_id, fx.account.id);

    let err = fx.repo.join_shift(fx.account.id, shift.id).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(!err.is_retryable());
    assert_eq!(fx.repo.count_helpers(shift.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_same_volunteer_can_join_different_shifts() {
    let fx = Fixture::new().await;
    let morning = fx.repo.store_shift(fx.shift(dt(5, 1, 6, 0), dt(5, 1, 12, 0))).await.unwrap();
    let evening = fx.repo.store_shift(fx.shift(dt(5, 1, 18, 0), dt(5, 1, 23, 0))).await.unwrap();

    fx.repo.join_shift(fx.account.id, morning.id).await.unwrap();
    fx.repo.join_shift(fx.account.id, evening.id).await.unwrap();

    let shifts = fx.repo.list_shifts_for_user(fx.account.id).await.unwrap();
    let ids: Vec<ShiftId> = shifts.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![morning.id, evening.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sign_ups_admit_exactly_one() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    let repo = Arc::new(fx.repo.clone());
    let shift_id = shift.id;

    let attempts: Vec<_> = (0..16)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let account = fx.account.id;
            tokio::spawn(async move { repo.join_shift(account, shift_id).await })
        })
        .collect();

    let mut joined = 0;
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => joined += 1,
            Err(e) if e.is_unique_violation() => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(joined, 1);
    assert_eq!(rejected, 15);
    assert_eq!(fx.repo.helper_count(), 1);
}

#[tokio::test]
async fn test_leave_then_rejoin() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();

    fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();
    assert!(fx.repo.leave_shift(fx.account.id, shift.id).await.unwrap());
    assert!(!fx.repo.leave_shift(fx.account.id, shift.id).await.unwrap());

    fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();
    assert_eq!(fx.repo.count_helpers(shift.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_join_requires_existing_account_and_shift() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();

    let err = fx
        .repo
        .join_shift(UserAccountId::new(9999), shift.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.context().entity.as_deref(), Some("user_account"));

    let err = fx
        .repo
        .join_shift(fx.account.id, ShiftId::new(9999))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_helpers_listed_in_join_order() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    let bob = fx.account("bob").await;
    let carol = fx.account("carol").await;

    for account in [&bob, &fx.account, &carol] {
        fx.repo.join_shift(account.id, shift.id).await.unwrap();
    }

    let helpers = fx.repo.list_helpers_for_shift(shift.id).await.unwrap();
    let accounts: Vec<UserAccountId> = helpers.iter().map(|h| h.user_account_id).collect();
    assert_eq!(accounts, vec![bob.id, fx.account.id, carol.id]);

    let detail = fx.repo.get_shift_helper_detail(helpers[0].id).await.unwrap();
    assert_eq!(detail.describe(), "bob on Translation");
}

// =========================================================
// Cascades
// =========================================================

#[tokio::test]
async fn test_deleting_shift_removes_its_sign_ups() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();

    assert!(fx.repo.delete_shift(shift.id).await.unwrap());
    assert_eq!(fx.repo.helper_count(), 0);
    assert!(!fx.repo.delete_shift(shift.id).await.unwrap());
}

#[tokio::test]
async fn test_deleting_account_removes_its_sign_ups_only() {
    let fx = Fixture::new().await;
    let shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    let bob = fx.account("bob").await;
    fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();
    fx.repo.join_shift(bob.id, shift.id).await.unwrap();

    assert!(fx.repo.delete_user_account(bob.id).await.unwrap());
    assert_eq!(fx.repo.count_helpers(shift.id).await.unwrap(), 1);
    assert_eq!(fx.repo.shift_count(), 1);
}

#[tokio::test]
async fn test_deleting_facility_cascades_to_everything_below_it() {
    let fx = Fixture::new().await;
    let workplace = fx
        .repo
        .store_workplace(NewWorkplace {
            facility_id: fx.facility.id,
            name: "Platform 1".to_string(),
            description: String::new(),
            shift_contact_id: None,
        })
        .await
        .unwrap();
    let mut new_shift = fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0));
    new_shift.workplace_id = Some(workplace.id);
    let shift = fx.repo.store_shift(new_shift).await.unwrap();
    fx.repo.join_shift(fx.account.id, shift.id).await.unwrap();

    assert!(fx.repo.delete_facility(fx.facility.id).await.unwrap());

    assert!(fx.repo.get_workplace(workplace.id).await.unwrap_err().is_not_found());
    assert!(fx.repo.get_task(fx.task.id).await.unwrap_err().is_not_found());
    assert_eq!(fx.repo.shift_count(), 0);
    assert_eq!(fx.repo.helper_count(), 0);
    // Accounts are not owned by a facility.
    assert!(fx.repo.get_user_account(fx.account.id).await.is_ok());
}

#[tokio::test]
async fn test_deleting_task_removes_its_shifts() {
    let fx = Fixture::new().await;
    fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();

    assert!(fx.repo.delete_task(fx.task.id).await.unwrap());
    assert_eq!(fx.repo.shift_count(), 0);
    assert!(fx.repo.get_facility(fx.facility.id).await.is_ok());
}

#[tokio::test]
async fn test_deleting_contact_detaches_it() {
    let fx = Fixture::new().await;
    let contact = fx.contact("Dana").await;
    let mut new_shift = fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0));
    new_shift.shift_contact_id = Some(contact.id);
    let shift = fx.repo.store_shift(new_shift).await.unwrap();

    let detail = fx.repo.get_shift_detail(shift.id).await.unwrap();
    assert_eq!(detail.resolve_contact(), Some(&contact));

    assert!(fx.repo.delete_contact(contact.id).await.unwrap());
    let shift = fx.repo.get_shift(shift.id).await.unwrap();
    assert_eq!(shift.shift_contact_id, None);
    let detail = fx.repo.get_shift_detail(shift.id).await.unwrap();
    assert_eq!(detail.resolve_contact(), None);
}

// =========================================================
// Validation and references
// =========================================================

#[tokio::test]
async fn test_store_shift_rejects_invalid_fields() {
    let fx = Fixture::new().await;

    let mut negative = fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0));
    negative.slots = -3;
    let err = fx.repo.store_shift(negative).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let inverted = fx.shift(dt(5, 1, 17, 0), dt(5, 1, 9, 0));
    let err = fx.repo.store_shift(inverted).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(fx.repo.shift_count(), 0);
}

#[tokio::test]
async fn test_store_shift_rejects_unknown_references() {
    let fx = Fixture::new().await;

    let mut orphan = fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0));
    orphan.task_id = TaskId::new(4242);
    assert!(fx.repo.store_shift(orphan).await.unwrap_err().is_not_found());

    let mut orphan = fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0));
    orphan.shift_contact_id = Some(ContactPersonId::new(4242));
    assert!(fx.repo.store_shift(orphan).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_update_shift_revalidates() {
    let fx = Fixture::new().await;
    let mut shift = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();

    shift.slots = 8;
    let updated = fx.repo.update_shift(shift.clone()).await.unwrap();
    assert_eq!(updated.slots, 8);
    assert_eq!(fx.repo.get_shift(shift.id).await.unwrap().slots, 8);

    shift.ending_time = dt(4, 30, 9, 0);
    assert!(matches!(
        fx.repo.update_shift(shift).await.unwrap_err(),
        RepositoryError::ValidationError { .. }
    ));
}

#[tokio::test]
async fn test_usernames_are_unique_and_non_empty() {
    let fx = Fixture::new().await;

    let err = fx
        .repo
        .store_user_account(NewUserAccount {
            username: "alice".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let err = fx
        .repo
        .store_user_account(NewUserAccount {
            username: "   ".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

// =========================================================
// Filters and ordering
// =========================================================

#[tokio::test]
async fn test_list_shifts_filters_compose() {
    let fx = Fixture::new().await;
    let other = fx
        .repo
        .store_facility(NewFacility {
            name: "Harbour".to_string(),
            description: String::new(),
            shift_contact_id: None,
        })
        .await
        .unwrap();
    let other_task = fx
        .repo
        .store_task(NewTask {
            facility_id: other.id,
            workplace_id: None,
            name: "Logistics".to_string(),
            description: String::new(),
            shift_contact_id: None,
        })
        .await
        .unwrap();

    let overnight = fx.repo.store_shift(fx.shift(dt(5, 1, 22, 0), dt(5, 2, 6, 0))).await.unwrap();
    let next_day = fx.repo.store_shift(fx.shift(dt(5, 2, 9, 0), dt(5, 2, 17, 0))).await.unwrap();
    let mut harbour = fx.shift(dt(5, 2, 10, 0), dt(5, 2, 12, 0));
    harbour.facility_id = other.id;
    harbour.task_id = other_task.id;
    let harbour = fx.repo.store_shift(harbour).await.unwrap();

    let ids = |shifts: Vec<Shift>| shifts.into_iter().map(|s| s.id).collect::<Vec<_>>();
    let may = |d| NaiveDate::from_ymd_opt(2023, 5, d).unwrap();

    assert_eq!(
        ids(fx.repo.list_shifts(&ShiftFilter::all()).await.unwrap()),
        vec![overnight.id, next_day.id, harbour.id]
    );
    assert_eq!(
        ids(fx.repo.list_shifts(&ShiftFilter::all().on_date(may(2))).await.unwrap()),
        vec![overnight.id, next_day.id, harbour.id]
    );
    assert_eq!(
        ids(fx.repo.list_shifts(&ShiftFilter::all().on_date(may(1))).await.unwrap()),
        vec![overnight.id]
    );
    assert_eq!(
        ids(fx
            .repo
            .list_shifts(&ShiftFilter::all().facility(fx.facility.id).on_date(may(2)))
            .await
            .unwrap()),
        vec![overnight.id, next_day.id]
    );
    assert_eq!(
        ids(fx
            .repo
            .list_shifts(&ShiftFilter::all().open_at(dt(5, 2, 11, 0)))
            .await
            .unwrap()),
        vec![next_day.id, harbour.id]
    );
}

#[tokio::test]
async fn test_date_filter_on_last_representable_date() {
    let fx = Fixture::new().await;
    let last = NaiveDate::MAX;
    let eve = last.pred_opt().unwrap();
    let overnight = fx
        .repo
        .store_shift(fx.shift(
            eve.and_hms_opt(22, 0, 0).unwrap(),
            last.and_hms_opt(6, 0, 0).unwrap(),
        ))
        .await
        .unwrap();
    let final_day = fx
        .repo
        .store_shift(fx.shift(
            last.and_hms_opt(8, 0, 0).unwrap(),
            last.and_hms_opt(17, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    let shifts = fx.repo.list_shifts(&ShiftFilter::all().on_date(last)).await.unwrap();
    let ids: Vec<ShiftId> = shifts.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![overnight.id, final_day.id]);
}

#[tokio::test]
async fn test_identical_times_order_by_id() {
    let fx = Fixture::new().await;
    let first = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    let second = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 17, 0))).await.unwrap();
    let shorter = fx.repo.store_shift(fx.shift(dt(5, 1, 9, 0), dt(5, 1, 12, 0))).await.unwrap();

    let shifts = fx.repo.list_shifts(&ShiftFilter::all()).await.unwrap();
    let ids: Vec<ShiftId> = shifts.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![shorter.id, first.id, second.id]);
}

#[tokio::test]
async fn test_facilities_listed_by_name() {
    let fx = Fixture::new().await;
    fx.repo
        .store_facility(NewFacility {
            name: "Airport".to_string(),
            description: String::new(),
            shift_contact_id: None,
        })
        .await
        .unwrap();

    let names: Vec<String> = fx
        .repo
        .list_facilities()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Airport", "Central Station"]);
}

#[tokio::test]
async fn test_unhealthy_repository_reports_retryable_errors() {
    let fx = Fixture::new().await;
    fx.repo.set_healthy(false);

    assert!(!fx.repo.health_check().await.unwrap());
    let err = fx
        .repo
        .join_shift(fx.account.id, ShiftId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    assert!(err.is_retryable());
}
