use anyhow::{Result, bail};
use dialoguer::{Input, Password, console::Term};
use tracing::info;

use super::{Context, render};

pub async fn login(
    ctx: &Context,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text_on(&Term::stderr())?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact_on(&Term::stderr())?,
    };
    if email.trim().is_empty() || password.is_empty() {
        bail!("email dan password wajib diisi");
    }

    let grant = ctx.client.login(email.trim(), &password).await?;
    if ctx.json {
        return render::print_json(&grant.user);
    }
    let label = grant.user.map(|u| u.label());
    println!("Signed in as {}", label.as_deref().unwrap_or("admin"));
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.client.logout();
    info!("session cleared");
    println!("Signed out");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let state = ctx.client.session().get_state();
    if !state.is_authenticated() {
        bail!("not signed in; run `dracinctl login`");
    }
    if ctx.json {
        return render::print_json(&state.user);
    }

    let user = state.user.unwrap_or_else(|| dracin_model::AdminUser {
        id: None,
        email: None,
        name: None,
        role: None,
    });
    render::print_fields(&[
        ("name", user.label()),
        ("email", render::or_dash(user.email.as_deref())),
        ("role", render::or_dash(user.role.as_deref())),
        ("api", ctx.client.base_url().to_string()),
    ]);
    Ok(())
}
