//! The dashboard's route tree.

use watchdesk_router::{RouteDescriptor, RouteError, RouteMeta, RouteTable};

pub fn dashboard_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::new("/")
            .named("Dashboard")
            .component("Dashboard")
            .meta(RouteMeta::authenticated()),
        RouteDescriptor::new("/login")
            .named("Login")
            .component("Login")
            .meta(RouteMeta::guest_only()),
        RouteDescriptor::new("/admin")
            .component("AdminLayout")
            .meta(RouteMeta::admin())
            .redirect("/admin/reports")
            .children(vec![
                RouteDescriptor::new("reports")
                    .named("AdminReports")
                    .component("AdminReportDashboard"),
                RouteDescriptor::new("cameras")
                    .named("AdminCameras")
                    .component("AdminCameras"),
                RouteDescriptor::new("assignments")
                    .named("AdminAssignments")
                    .component("AdminAssignments"),
                RouteDescriptor::new("officers")
                    .named("AdminOfficers")
                    .component("AdminOfficers"),
            ]),
        RouteDescriptor::new("/inspector")
            .component("InspectorLayout")
            .meta(RouteMeta::inspector())
            .redirect("/inspector/cameras")
            .children(vec![
                RouteDescriptor::new("cameras")
                    .named("InspectorCameras")
                    .component("InspectorCameras"),
                RouteDescriptor::new("reports")
                    .named("InspectorReports")
                    .component("InspectorReports"),
            ]),
    ]
}

pub fn dashboard_table() -> Result<RouteTable, RouteError> {
    RouteTable::new(dashboard_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_roots_redirect_to_their_first_page() {
        let table = dashboard_table().unwrap();

        let admin = table.resolve("/admin").unwrap();
        assert_eq!(admin.path, "/admin/reports");
        assert_eq!(admin.name.as_deref(), Some("AdminReports"));
        assert_eq!(admin.redirected_from.as_deref(), Some("/admin"));
        assert!(admin.requirements.requires_admin);

        let inspector = table.resolve("/inspector/").unwrap();
        assert_eq!(inspector.path, "/inspector/cameras");
        assert!(inspector.requirements.requires_inspector);
        assert!(inspector.requirements.requires_auth);
    }

    #[test]
    fn named_routes_have_full_paths() {
        let table = dashboard_table().unwrap();
        assert_eq!(table.path_for("AdminOfficers").as_deref(), Some("/admin/officers"));
        assert_eq!(table.path_for("InspectorReports").as_deref(), Some("/inspector/reports"));
        assert_eq!(table.path_for("Login").as_deref(), Some("/login"));
    }

    #[test]
    fn login_is_guest_only() {
        let table = dashboard_table().unwrap();
        let login = table.resolve("/login?next=/admin").unwrap();
        assert!(login.requirements.guest_only);
        assert!(!login.requirements.requires_auth);
    }
}
