use std::sync::Arc;

use academia_backend::domain::commands::enrollment::{CreateEnrollmentCommand, EnrollmentListQuery};
use academia_backend::domain::models::enrollment::EnrollmentStatus;
use academia_backend::domain::models::user::Role;
use academia_backend::domain::navigation::{resolve_view, MenuCatalog, ModuleView, TabManager, ViewResolution};
use academia_backend::domain::session::License;
use academia_backend::domain::DomainError;
use academia_backend::storage::memory::test_utils::{seed_enrollment, seed_plan, seed_student, seed_user};
use academia_backend::{AppConfig, Backend, MemoryConnection};
use chrono::NaiveDate;

fn backend_with(conn: &Arc<MemoryConnection>) -> Backend {
    Backend::with_memory(AppConfig::default(), conn.clone())
}

#[tokio::test]
async fn deactivate_then_reactivate_round_trips() {
    let conn = Arc::new(MemoryConnection::new());
    let backend = backend_with(&conn);
    let student = seed_student(&conn, "Ana Lima", "123").await;
    let plan = seed_plan(&conn, "Mensal", "99.90").await;

    let enrollment = backend
        .enrollments
        .create(CreateEnrollmentCommand {
            student_id: student.id.clone(),
            plan_id: plan.id.clone(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_day: 10,
            final_value: plan.monthly_fee,
        })
        .await
        .unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Active);

    let inactive = backend.enrollments.deactivate(&enrollment.id, "Mudou de cidade").await.unwrap();
    assert_eq!(inactive.status, EnrollmentStatus::Inactive);
    assert_eq!(inactive.deactivation_reason.as_deref(), Some("Mudou de cidade"));

    let active = backend.enrollments.reactivate(&enrollment.id).await.unwrap();
    assert_eq!(active.id, enrollment.id);
    assert_eq!(active.status, EnrollmentStatus::Active);
    assert_eq!(active.deactivation_reason, None);

    let all = backend.enrollments.list(&EnrollmentListQuery::default()).await.unwrap();
    assert_eq!(all.len(), 1);

    // Reactivating an active enrollment is a state error
    assert!(matches!(
        backend.enrollments.reactivate(&enrollment.id).await.unwrap_err(),
        DomainError::InvalidState(_)
    ));
}

#[tokio::test]
async fn pending_enrollment_activation_and_search() {
    let conn = Arc::new(MemoryConnection::new());
    let backend = backend_with(&conn);
    let ana = seed_student(&conn, "Ana Lima", "123").await;
    let bruno = seed_student(&conn, "Bruno Costa", "456").await;
    let plan = seed_plan(&conn, "Trimestral", "270").await;
    let pending = seed_enrollment(&conn, &ana, &plan, EnrollmentStatus::Pending).await;
    seed_enrollment(&conn, &bruno, &plan, EnrollmentStatus::Active).await;

    let activated = backend.enrollments.activate_pending(&pending.id).await.unwrap();
    assert_eq!(activated.status, EnrollmentStatus::Active);

    let found = backend
        .enrollments
        .list(&EnrollmentListQuery {
            student_id: None,
            search: Some("BRUNO".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].student_id, bruno.id);

    backend.enrollments.delete(&pending.id).await.unwrap();
    assert!(matches!(
        backend.enrollments.get(&pending.id).await.unwrap_err(),
        DomainError::NotFound(_)
    ));
}

#[tokio::test]
async fn login_builds_a_session_that_drives_the_menu() {
    let conn = Arc::new(MemoryConnection::new());
    let backend = backend_with(&conn);
    seed_user(&conn, "gerente", "segredo", Role::Manager).await;
    seed_user(&conn, "root", "segredo", Role::SuperAdmin).await;
    conn.set_license(Some(License {
        kind: "ANUAL".to_string(),
        expires_on: NaiveDate::from_ymd_opt(2027, 1, 1),
        days_remaining: None,
    }))
    .await;

    assert!(matches!(
        backend.auth.login("gerente", "errada").await.unwrap_err(),
        DomainError::Auth(_)
    ));

    let manager = backend.auth.login("gerente", "segredo").await.unwrap();
    assert!(manager.is_license_valid(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
    assert!(!manager.is_license_valid(NaiveDate::from_ymd_opt(2027, 1, 2).unwrap()));
    assert!(backend.auth.validate(&manager).await.unwrap());
    // Without grants a manager sees no menu at all
    assert!(MenuCatalog::standard().filtered(&manager).menus().is_empty());

    let root = backend.auth.login("root", "segredo").await.unwrap();
    let menu = MenuCatalog::standard().filtered(&root);
    assert_eq!(menu.menus().len(), 4);

    let mut tabs = TabManager::new();
    let (top, item) = MenuCatalog::standard().find("licencas").unwrap();
    let licenses = tabs.open_tab(MenuCatalog::tab_descriptor(top, item));
    let tab = tabs.active().unwrap().clone();
    assert_eq!(tab.id, licenses);
    assert_eq!(resolve_view(&tab, &root), ViewResolution::View(ModuleView::Licenses));

    backend.auth.logout().await.unwrap();
    assert!(!backend.auth.validate(&root).await.unwrap());
}

#[tokio::test]
async fn deleting_a_student_drops_their_enrollments() {
    let conn = Arc::new(MemoryConnection::new());
    let backend = backend_with(&conn);
    let ana = seed_student(&conn, "Ana Lima", "123").await;
    let bruno = seed_student(&conn, "Bruno Costa", "456").await;
    let plan = seed_plan(&conn, "Mensal", "99.90").await;
    let enrollment = backend
        .enrollments
        .create(CreateEnrollmentCommand {
            student_id: ana.id.clone(),
            plan_id: plan.id.clone(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_day: 5,
            final_value: plan.monthly_fee,
        })
        .await
        .unwrap();
    let kept = seed_enrollment(&conn, &bruno, &plan, EnrollmentStatus::Active).await;

    backend.students.delete(&ana.id).await.unwrap();

    let own = backend
        .enrollments
        .list(&EnrollmentListQuery {
            student_id: Some(ana.id.clone()),
            search: None,
        })
        .await
        .unwrap();
    assert!(own.is_empty());
    assert!(matches!(
        backend.enrollments.get(&enrollment.id).await.unwrap_err(),
        DomainError::NotFound(_)
    ));

    // Other students keep theirs
    let all = backend.enrollments.list(&EnrollmentListQuery::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, kept.id);
}
