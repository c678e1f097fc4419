use admin_crud::{FormError, FormFields, FormSchema};

use crate::commands::{CreateUser, UpdateUser};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

/// Username and email fields shared by the create and edit screens.
pub struct UserForm;

impl FormSchema<CreateUser> for UserForm {
    fn name(&self) -> &str {
        "user"
    }

    fn bind(&self, command: &mut CreateUser, fields: &FormFields) -> Vec<FormError> {
        bind_text(&mut command.username, fields, "username");
        bind_text(&mut command.email, fields, "email");
        Vec::new()
    }

    fn validate(&self, command: &CreateUser) -> Vec<FormError> {
        validate_user_fields(&command.username, &command.email)
    }
}

impl FormSchema<UpdateUser> for UserForm {
    fn name(&self) -> &str {
        "user"
    }

    fn bind(&self, command: &mut UpdateUser, fields: &FormFields) -> Vec<FormError> {
        bind_text(&mut command.username, fields, "username");
        bind_text(&mut command.email, fields, "email");
        Vec::new()
    }

    fn validate(&self, command: &UpdateUser) -> Vec<FormError> {
        validate_user_fields(&command.username, &command.email)
    }
}

fn bind_text(target: &mut String, fields: &FormFields, name: &str) {
    if let Some(value) = fields.get(name) {
        *target = value.trim().to_string();
    }
}

fn validate_user_fields(username: &str, email: &str) -> Vec<FormError> {
    let mut errors = Vec::new();

    let length = username.chars().count();
    if length == 0 {
        errors.push(FormError::field("username", "Username is required."));
    } else if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        errors.push(FormError::field(
            "username",
            format!("Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters."),
        ));
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        errors.push(FormError::field(
            "username",
            "Username may only contain letters, digits, '.', '-' and '_'.",
        ));
    }

    if email.is_empty() {
        errors.push(FormError::field("email", "Email is required."));
    } else if !looks_like_email(email) {
        errors.push(FormError::field("email", "Email address is not valid."));
    }

    errors
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split('.')
            .filter(|part| !part.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
