use colored::Colorize;
use storefront::{RegistrationForm, Storefront, StorefrontError};

/// `storefront register <username> --password <p> --confirm <p>`
pub async fn run(
    shop: &Storefront,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<String, StorefrontError> {
    let form = RegistrationForm::new(username, password, confirm);
    shop.registration().register(&form).await?;
    Ok(format!("{}", "Registered successfully".green()))
}
