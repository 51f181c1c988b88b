//! # Navigation
//!
//! Menu catalogue, open tabs and the mapping from a tab to the screen it
//! shows. Submenu ids are resolved to a [`ModuleView`] once, so callers
//! match on an enum instead of comparing strings.

pub mod menu;
pub mod tabs;

pub use menu::{MenuCatalog, MenuEntry, MenuGroup, MenuItem, MenuState, Permission, TopMenu};
pub use tabs::{Tab, TabDescriptor, TabId, TabManager};

use crate::domain::models::user::Role;
use crate::domain::session::SessionContext;

/// One variant per screen reachable from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleView {
    Students,
    Employees,
    Enrollments,
    Classes,
    Attendance,
    Visitors,
    Instructors,
    Locations,
    JobRoles,
    Plans,
    Discounts,
    Modalities,
    Equipment,
    Tuition,
    Receivables,
    Payables,
    CashRegister,
    AttendanceReport,
    FinancialReport,
    CompanyData,
    Users,
    Licenses,
    System,
}

impl ModuleView {
    pub const ALL: [ModuleView; 23] = [
        ModuleView::Students,
        ModuleView::Employees,
        ModuleView::Enrollments,
        ModuleView::Classes,
        ModuleView::Attendance,
        ModuleView::Visitors,
        ModuleView::Instructors,
        ModuleView::Locations,
        ModuleView::JobRoles,
        ModuleView::Plans,
        ModuleView::Discounts,
        ModuleView::Modalities,
        ModuleView::Equipment,
        ModuleView::Tuition,
        ModuleView::Receivables,
        ModuleView::Payables,
        ModuleView::CashRegister,
        ModuleView::AttendanceReport,
        ModuleView::FinancialReport,
        ModuleView::CompanyData,
        ModuleView::Users,
        ModuleView::Licenses,
        ModuleView::System,
    ];

    pub fn submenu_id(&self) -> &'static str {
        match self {
            ModuleView::Students => "alunos",
            ModuleView::Employees => "funcionarios",
            ModuleView::Enrollments => "matriculas",
            ModuleView::Classes => "turmas",
            ModuleView::Attendance => "frequencia",
            ModuleView::Visitors => "visitantes",
            ModuleView::Instructors => "instrutores",
            ModuleView::Locations => "locais",
            ModuleView::JobRoles => "funcoes",
            ModuleView::Plans => "planos",
            ModuleView::Discounts => "descontos",
            ModuleView::Modalities => "modalidades",
            ModuleView::Equipment => "equipamentos",
            ModuleView::Tuition => "mensalidades",
            ModuleView::Receivables => "contas-receber",
            ModuleView::Payables => "contas-pagar",
            ModuleView::CashRegister => "caixa",
            ModuleView::AttendanceReport => "frequencia-relatorio",
            ModuleView::FinancialReport => "financeiro-relatorio",
            ModuleView::CompanyData => "dados-academia",
            ModuleView::Users => "usuarios",
            ModuleView::Licenses => "licencas",
            ModuleView::System => "sistema",
        }
    }

    pub fn from_submenu_id(id: &str) -> Option<Self> {
        ModuleView::ALL.into_iter().find(|view| view.submenu_id() == id)
    }

    /// Permission module guarding the screen
    pub fn permission_module(&self) -> &'static str {
        match self {
            ModuleView::Receivables => "contasReceber",
            ModuleView::Payables => "contasPagar",
            ModuleView::AttendanceReport => "relatorioFrequencia",
            ModuleView::FinancialReport => "relatorioFinanceiro",
            ModuleView::CompanyData => "dadosAcademia",
            other => other.submenu_id(),
        }
    }

    /// Whether a working screen exists; the rest show the placeholder
    pub fn has_screen(&self) -> bool {
        !matches!(
            self,
            ModuleView::Instructors
                | ModuleView::Modalities
                | ModuleView::Equipment
                | ModuleView::Tuition
                | ModuleView::FinancialReport
                | ModuleView::System
        )
    }
}

/// What the content area shows for a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewResolution {
    View(ModuleView),
    /// "Module under development"
    Placeholder { label: String, description: String },
    Forbidden { reason: String },
}

pub fn resolve_view(tab: &Tab, session: &SessionContext) -> ViewResolution {
    let placeholder = || ViewResolution::Placeholder {
        label: tab.label.clone(),
        description: tab.description.clone(),
    };

    match ModuleView::from_submenu_id(&tab.submenu_id) {
        Some(ModuleView::Licenses) if !session.has_role(Role::SuperAdmin) => ViewResolution::Forbidden {
            reason: "only SUPER_ADMIN can access license control".to_string(),
        },
        Some(view) if view.has_screen() => ViewResolution::View(view),
        _ => placeholder(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionUser;

    fn session(role: Role) -> SessionContext {
        SessionContext::new(SessionUser {
            id: "usuario::1".to_string(),
            name: "Teste".to_string(),
            username: "teste".to_string(),
            email: None,
            role,
            permissions: Vec::new(),
            company: None,
            license: None,
        })
    }

    fn tab(submenu_id: &str) -> Tab {
        Tab {
            id: TabId(1),
            menu_id: "configuracoes".to_string(),
            submenu_id: submenu_id.to_string(),
            label: "Tela".to_string(),
            description: "Descrição".to_string(),
        }
    }

    #[test]
    fn test_submenu_ids_round_trip() {
        for view in ModuleView::ALL {
            assert_eq!(ModuleView::from_submenu_id(view.submenu_id()), Some(view));
        }
        assert_eq!(ModuleView::from_submenu_id("inexistente"), None);
    }

    #[test]
    fn test_licenses_need_super_admin() {
        assert!(matches!(
            resolve_view(&tab("licencas"), &session(Role::Admin)),
            ViewResolution::Forbidden { .. }
        ));
        assert_eq!(
            resolve_view(&tab("licencas"), &session(Role::SuperAdmin)),
            ViewResolution::View(ModuleView::Licenses)
        );
    }

    #[test]
    fn test_unknown_and_unbuilt_views_show_placeholder() {
        let admin = session(Role::Admin);
        assert_eq!(
            resolve_view(&tab("caixa"), &admin),
            ViewResolution::View(ModuleView::CashRegister)
        );
        for id in ["inexistente", "sistema"] {
            assert!(matches!(
                resolve_view(&tab(id), &admin),
                ViewResolution::Placeholder { .. }
            ));
        }
    }

    #[test]
    fn test_permission_modules_match_catalog() {
        for view in ModuleView::ALL {
            let (_, item) = MenuCatalog::standard().find(view.submenu_id()).unwrap();
            assert_eq!(item.permission.map(|p| p.module), Some(view.permission_module()));
        }
    }
}
