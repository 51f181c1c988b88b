//! Two-level menu catalogue and its open/closed state.

use log::debug;
use once_cell::sync::Lazy;

use super::tabs::TabDescriptor;
use crate::domain::session::SessionContext;

pub const ACCESS_ACTION: &str = "acessar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub module: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: &'static str,
    pub route: &'static str,
    pub description: &'static str,
    /// `None` means visible to everyone
    pub permission: Option<Permission>,
}

/// Nested group inside a top menu, e.g. "Cadastros Auxiliares"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub id: &'static str,
    pub label: &'static str,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item(MenuItem),
    Group(MenuGroup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopMenu {
    pub id: &'static str,
    pub label: &'static str,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCatalog {
    menus: Vec<TopMenu>,
}

fn item(
    id: &'static str,
    label: &'static str,
    route: &'static str,
    description: &'static str,
    module: &'static str,
) -> MenuItem {
    MenuItem {
        id,
        label,
        route,
        description,
        permission: Some(Permission {
            module,
            action: ACCESS_ACTION,
        }),
    }
}

static STANDARD: Lazy<MenuCatalog> = Lazy::new(|| MenuCatalog {
    menus: vec![
        TopMenu {
            id: "controle",
            label: "Controle",
            entries: vec![
                MenuEntry::Item(item("alunos", "Alunos", "/controle/alunos", "Cadastro e controle de alunos", "alunos")),
                MenuEntry::Item(item(
                    "funcionarios",
                    "Funcionários",
                    "/controle/funcionarios",
                    "Gestão de funcionários da academia",
                    "funcionarios",
                )),
                MenuEntry::Item(item(
                    "matriculas",
                    "Matrículas",
                    "/controle/matriculas",
                    "Gestão de matrículas de alunos",
                    "matriculas",
                )),
                MenuEntry::Item(item("turmas", "Turmas", "/controle/turmas", "Cadastro e gestão de turmas", "turmas")),
                MenuEntry::Item(item(
                    "frequencia",
                    "Frequência",
                    "/controle/frequencia",
                    "Controle de frequência dos alunos",
                    "frequencia",
                )),
                MenuEntry::Item(item(
                    "visitantes",
                    "Visitantes",
                    "/controle/visitantes",
                    "Controle de visitantes da academia",
                    "visitantes",
                )),
                MenuEntry::Item(item(
                    "instrutores",
                    "Instrutores",
                    "/controle/instrutores",
                    "Gestão de instrutores e personal trainers",
                    "instrutores",
                )),
                MenuEntry::Group(MenuGroup {
                    id: "cadastros-auxiliares",
                    label: "Cadastros Auxiliares",
                    items: vec![
                        item("locais", "Locais", "/cadastros/locais", "Cadastro de locais e espaços da academia", "locais"),
                        item("funcoes", "Funções", "/cadastros/funcoes", "Cadastro de funções e cargos", "funcoes"),
                        item("planos", "Planos", "/cadastros/planos", "Cadastro de planos e modalidades", "planos"),
                        item(
                            "descontos",
                            "Descontos",
                            "/cadastros/descontos",
                            "Cadastro de descontos e promoções",
                            "descontos",
                        ),
                        item(
                            "modalidades",
                            "Modalidades",
                            "/cadastros/modalidades",
                            "Tipos de atividades oferecidas",
                            "modalidades",
                        ),
                        item(
                            "equipamentos",
                            "Equipamentos",
                            "/cadastros/equipamentos",
                            "Controle de equipamentos da academia",
                            "equipamentos",
                        ),
                    ],
                }),
            ],
        },
        TopMenu {
            id: "financeiro",
            label: "Financeiro",
            entries: vec![
                MenuEntry::Item(item(
                    "mensalidades",
                    "Mensalidades",
                    "/financeiro/mensalidades",
                    "Controle de pagamentos de alunos",
                    "mensalidades",
                )),
                MenuEntry::Item(item(
                    "contas-receber",
                    "Contas a Receber",
                    "/financeiro/contas-receber",
                    "Receitas e recebimentos",
                    "contasReceber",
                )),
                MenuEntry::Item(item(
                    "contas-pagar",
                    "Contas a Pagar",
                    "/financeiro/contas-pagar",
                    "Despesas e fornecedores",
                    "contasPagar",
                )),
                MenuEntry::Item(item(
                    "caixa",
                    "Controle de Caixa",
                    "/financeiro/caixa",
                    "Abertura, fechamento e movimentações",
                    "caixa",
                )),
            ],
        },
        TopMenu {
            id: "relatorios",
            label: "Relatórios",
            entries: vec![
                MenuEntry::Item(item(
                    "frequencia-relatorio",
                    "Frequência",
                    "/relatorios/frequencia",
                    "Relatório de frequência de alunos",
                    "relatorioFrequencia",
                )),
                MenuEntry::Item(item(
                    "financeiro-relatorio",
                    "Financeiro",
                    "/relatorios/financeiro",
                    "Relatórios financeiros e dashboards",
                    "relatorioFinanceiro",
                )),
            ],
        },
        TopMenu {
            id: "configuracoes",
            label: "Configurações",
            entries: vec![
                MenuEntry::Item(item(
                    "dados-academia",
                    "Dados da Academia",
                    "/configuracoes/empresa",
                    "Informações cadastrais da academia",
                    "dadosAcademia",
                )),
                MenuEntry::Item(item(
                    "usuarios",
                    "Usuários do Sistema",
                    "/configuracoes/usuarios",
                    "Gestão de usuários e permissões",
                    "usuarios",
                )),
                MenuEntry::Item(item(
                    "licencas",
                    "Controle de Licenças",
                    "/configuracoes/licencas",
                    "Gestão de licenças do sistema",
                    "licencas",
                )),
                MenuEntry::Item(item(
                    "sistema",
                    "Sistema",
                    "/configuracoes/sistema",
                    "Configurações gerais do sistema",
                    "sistema",
                )),
            ],
        },
    ],
});

fn is_visible(item: &MenuItem, session: &SessionContext) -> bool {
    item.permission
        .map_or(true, |p| session.has_permission(p.module, p.action))
}

impl MenuCatalog {
    /// The full application menu
    pub fn standard() -> &'static MenuCatalog {
        &STANDARD
    }

    pub fn menus(&self) -> &[TopMenu] {
        &self.menus
    }

    /// The menu as `session` may see it. Groups and top menus left without
    /// visible items are dropped.
    pub fn filtered(&self, session: &SessionContext) -> MenuCatalog {
        let menus: Vec<TopMenu> = self
            .menus
            .iter()
            .filter_map(|menu| {
                let entries: Vec<MenuEntry> = menu
                    .entries
                    .iter()
                    .filter_map(|entry| match entry {
                        MenuEntry::Item(item) => is_visible(item, session).then(|| entry.clone()),
                        MenuEntry::Group(group) => {
                            let items: Vec<MenuItem> = group
                                .items
                                .iter()
                                .filter(|item| is_visible(item, session))
                                .cloned()
                                .collect();
                            (!items.is_empty()).then(|| MenuEntry::Group(MenuGroup { items, ..group.clone() }))
                        }
                    })
                    .collect();
                (!entries.is_empty()).then(|| TopMenu { entries, ..menu.clone() })
            })
            .collect();

        debug!(
            "Menu filtered for {}: {} of {} top menus visible",
            session.current_user().username,
            menus.len(),
            self.menus.len()
        );
        MenuCatalog { menus }
    }

    /// Locate an item by submenu id, searching nested groups too
    pub fn find(&self, submenu_id: &str) -> Option<(&TopMenu, &MenuItem)> {
        self.menus.iter().find_map(|menu| {
            menu.entries.iter().find_map(|entry| match entry {
                MenuEntry::Item(item) if item.id == submenu_id => Some((menu, item)),
                MenuEntry::Item(_) => None,
                MenuEntry::Group(group) => group.items.iter().find(|i| i.id == submenu_id).map(|i| (menu, i)),
            })
        })
    }

    /// Descriptor used to open the tab for a menu item
    pub fn tab_descriptor(menu: &TopMenu, item: &MenuItem) -> TabDescriptor {
        TabDescriptor {
            menu_id: menu.id.to_string(),
            submenu_id: item.id.to_string(),
            label: item.label.to_string(),
            description: item.description.to_string(),
        }
    }
}

/// Which top menu and nested group are expanded. At most one of each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    open_menu: Option<String>,
    open_submenu: Option<String>,
}

fn toggle(slot: &mut Option<String>, id: &str) {
    if slot.as_deref() == Some(id) {
        *slot = None;
    } else {
        *slot = Some(id.to_string());
    }
}

impl MenuState {
    pub fn toggle_menu(&mut self, menu_id: &str) {
        toggle(&mut self.open_menu, menu_id);
    }

    pub fn toggle_submenu(&mut self, group_id: &str) {
        toggle(&mut self.open_submenu, group_id);
    }

    pub fn close_all(&mut self) {
        self.open_menu = None;
        self.open_submenu = None;
    }

    pub fn is_menu_open(&self, menu_id: &str) -> bool {
        self.open_menu.as_deref() == Some(menu_id)
    }

    pub fn is_submenu_open(&self, group_id: &str) -> bool {
        self.open_submenu.as_deref() == Some(group_id)
    }
}
