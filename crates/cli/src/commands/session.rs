//! Sign-in, registration, and session inspection.

use buildhive_storefront::error::Result;

use crate::context::AppContext;

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let identity = ctx.session.login(email, password).await?;
    ctx.cart.handle_auth_change(true).await?;
    println!("Signed in as {} <{}>", identity.full_name, identity.email);
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: &str,
    phone: Option<&str>,
) -> Result<()> {
    // The CLI has no second password field; the library still checks the
    // confirmation so it matches non-interactive callers.
    let identity = ctx
        .session
        .register(name, email, password, password, phone)
        .await?;
    println!("Account created for {} <{}>", identity.full_name, identity.email);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout().await;
    println!("Signed out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    use buildhive_storefront::session::IdentitySource;

    match ctx.session.current_user() {
        Some(identity) => {
            println!("{} <{}>", identity.full_name, identity.email);
            println!("role: {}", identity.role.as_str());
        }
        None => println!("Not signed in"),
    }
    Ok(())
}
