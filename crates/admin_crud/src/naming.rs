pub const DEFAULT_ROUTE_PREFIX: &str = "administration";
pub const SHARED_FORM_VIEW: &str = "@admin/shared/layout/form.html";

const FORM_ACTIONS: [&str; 3] = ["new", "edit", "form"];

/// Route and view naming for one entity of one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudNaming {
    prefix: String,
    domain: String,
    entity: String,
}

impl CrudNaming {
    pub fn new(
        prefix: impl Into<String>,
        domain: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            domain: domain.into(),
            entity: entity.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// `<prefix>_<domain>_<entity>_<action>`
    pub fn route_name(&self, action: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            self.prefix, self.domain, self.entity, action
        )
    }

    /// Form actions share one layout unless `override_form_views` is set.
    pub fn view_path(&self, action: &str, override_form_views: bool) -> String {
        if FORM_ACTIONS.contains(&action) && !override_form_views {
            return SHARED_FORM_VIEW.to_string();
        }

        format!(
            "@admin/domain/{}/{}/{}.html",
            self.domain, self.entity, action
        )
    }
}
