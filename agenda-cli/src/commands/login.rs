use agenda_core::Agenda;
use anyhow::Result;
use dialoguer::Password;

use crate::render::Render;

pub fn admin(agenda: &Agenda) -> Result<()> {
    let password = Password::new().with_prompt("  Password").interact()?;
    let session = agenda.login_admin(&password)?;
    println!("Signed in as {}", session.render());

    Ok(())
}

pub fn token(agenda: &Agenda, token: &str) -> Result<()> {
    let session = agenda.login_with_token(token)?;
    println!("Signed in as {}", session.render());

    Ok(())
}

pub fn guest(agenda: &Agenda) -> Result<()> {
    let session = agenda.login_guest()?;
    println!("Signed in as {}", session.render());

    Ok(())
}
