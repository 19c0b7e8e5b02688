use std::sync::Arc;

use crate::config::Config;

/// Route groups, mirroring the backend's URL namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    Auth,
    Health,
    Tasks,
    Campaigns,
    Core,
    Assets,
    Budgets,
    AccessControl,
    Reports,
    Pages,
}

/// Every route the harness knows. Detail routes carry the resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Logout,
    RefreshToken,
    Me,
    MyTeams,
    Health,
    TasksList,
    TaskDetail(u64),
    TaskComments(u64),
    CampaignsList,
    CampaignDetail(u64),
    CampaignTasks(u64),
    ProjectsList,
    ProjectDetail(u64),
    TeamsList,
    TeamDetail(u64),
    AssetsList,
    AssetDetail(u64),
    BudgetsList,
    BudgetDetail(u64),
    Roles,
    Permissions,
    ReportsList,
    ReportDetail(u64),
    HomePage,
    LoginPage,
    TasksPage,
    CampaignsPage,
    ProjectsPage,
    MetricsPage,
}

impl Endpoint {
    #[must_use]
    pub const fn domain(self) -> Domain {
        match self {
            Endpoint::Login
            | Endpoint::Logout
            | Endpoint::RefreshToken
            | Endpoint::Me
            | Endpoint::MyTeams => Domain::Auth,
            Endpoint::Health => Domain::Health,
            Endpoint::TasksList | Endpoint::TaskDetail(_) | Endpoint::TaskComments(_) => {
                Domain::Tasks
            }
            Endpoint::CampaignsList
            | Endpoint::CampaignDetail(_)
            | Endpoint::CampaignTasks(_) => Domain::Campaigns,
            Endpoint::ProjectsList
            | Endpoint::ProjectDetail(_)
            | Endpoint::TeamsList
            | Endpoint::TeamDetail(_) => Domain::Core,
            Endpoint::AssetsList | Endpoint::AssetDetail(_) => Domain::Assets,
            Endpoint::BudgetsList | Endpoint::BudgetDetail(_) => Domain::Budgets,
            Endpoint::Roles | Endpoint::Permissions => Domain::AccessControl,
            Endpoint::ReportsList | Endpoint::ReportDetail(_) => Domain::Reports,
            Endpoint::HomePage
            | Endpoint::LoginPage
            | Endpoint::TasksPage
            | Endpoint::CampaignsPage
            | Endpoint::ProjectsPage
            | Endpoint::MetricsPage => Domain::Pages,
        }
    }

    /// Whether the route is served by the frontend origin.
    #[must_use]
    pub const fn is_page(self) -> bool {
        matches!(self.domain(), Domain::Pages)
    }

    /// Path relative to the owning origin.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Endpoint::Login => "/auth/login/".to_owned(),
            Endpoint::Logout => "/auth/logout/".to_owned(),
            Endpoint::RefreshToken => "/auth/token/refresh/".to_owned(),
            Endpoint::Me => "/auth/me/".to_owned(),
            Endpoint::MyTeams => "/auth/me/teams/".to_owned(),
            Endpoint::Health => "/health/".to_owned(),
            Endpoint::TasksList => "/api/tasks/".to_owned(),
            Endpoint::TaskDetail(id) => format!("/api/tasks/{}/", id),
            Endpoint::TaskComments(id) => format!("/api/tasks/{}/comments/", id),
            Endpoint::CampaignsList => "/api/campaigns/".to_owned(),
            Endpoint::CampaignDetail(id) => format!("/api/campaigns/{}/", id),
            Endpoint::CampaignTasks(id) => format!("/api/campaigns/{}/tasks/", id),
            Endpoint::ProjectsList => "/api/core/projects/".to_owned(),
            Endpoint::ProjectDetail(id) => format!("/api/core/projects/{}/", id),
            Endpoint::TeamsList => "/api/core/teams/".to_owned(),
            Endpoint::TeamDetail(id) => format!("/api/core/teams/{}/", id),
            Endpoint::AssetsList => "/api/assets/".to_owned(),
            Endpoint::AssetDetail(id) => format!("/api/assets/{}/", id),
            Endpoint::BudgetsList => "/api/budgets/".to_owned(),
            Endpoint::BudgetDetail(id) => format!("/api/budgets/{}/", id),
            Endpoint::Roles => "/api/access-control/roles/".to_owned(),
            Endpoint::Permissions => "/api/access-control/permissions/".to_owned(),
            Endpoint::ReportsList => "/api/reports/".to_owned(),
            Endpoint::ReportDetail(id) => format!("/api/reports/{}/", id),
            Endpoint::HomePage => "/".to_owned(),
            Endpoint::LoginPage => "/login".to_owned(),
            Endpoint::TasksPage => "/tasks".to_owned(),
            Endpoint::CampaignsPage => "/campaigns".to_owned(),
            Endpoint::ProjectsPage => "/projects".to_owned(),
            Endpoint::MetricsPage => "/api/metrics".to_owned(),
        }
    }
}

/// Resolves [`Endpoint`]s against the configured origins. Holds no mutable
/// state, so the same endpoint always yields the same URL.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    base_url: Arc<str>,
    frontend_url: Arc<str>,
}

impl EndpointRegistry {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: Arc::from(config.base_url.as_str()),
            frontend_url: Arc::from(config.frontend_url.as_str()),
        }
    }

    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        let origin = if endpoint.is_page() {
            &self.frontend_url
        } else {
            &self.base_url
        };
        format!("{}{}", origin, endpoint.path())
    }
}
