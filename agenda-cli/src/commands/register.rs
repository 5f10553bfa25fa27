use agenda_core::{Agenda, RegistrationForm};
use anyhow::Result;
use dialoguer::{Input, Password};

use crate::render::Render;

pub fn run(agenda: &Agenda, name: Option<String>, email: Option<String>) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new().with_prompt("  Name").interact_text()?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new().with_prompt("  Email").interact_text()?,
    };
    let password = Password::new().with_prompt("  Password").interact()?;
    let confirm_password = Password::new().with_prompt("  Confirm password").interact()?;

    let session = agenda.register(&RegistrationForm {
        name,
        email,
        password,
        confirm_password,
    })?;
    println!("Welcome, {}", session.render());

    Ok(())
}
