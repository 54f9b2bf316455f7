//! Product and category commands. Mutations require an admin session.

use std::path::{Path, PathBuf};

use jhytermax_admin::AdminConsole;
use jhytermax_core::{CategoryId, ProductId, format_naira};
use jhytermax_storefront::AppState;
use jhytermax_storefront::api::{ImageUpload, Product, ProductDraft};
use rust_decimal::Decimal;

use super::CommandResult;

/// Arguments of `products create`.
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub image: Option<PathBuf>,
}

fn log_product(product: &Product) {
    let category = product
        .category
        .as_ref()
        .map_or("uncategorised", |c| c.name.as_str());
    tracing::info!(
        "#{:<5} {:<32} {:>12}  qty {:<5} {}",
        product.id,
        product.name,
        format_naira(product.price),
        product.quantity,
        category
    );
}

pub async fn list_products(state: &AppState) -> CommandResult {
    let products = state.api().list_products().await?;
    if products.is_empty() {
        tracing::info!("No products");
    }
    products.iter().for_each(log_product);
    Ok(())
}

pub async fn show_product(state: &AppState, id: ProductId) -> CommandResult {
    let product = state.api().get_product(id).await?;
    log_product(&product);
    if !product.description.is_empty() {
        tracing::info!("{}", product.description);
    }
    if let Some(image) = &product.image {
        tracing::info!("Image: {image}");
    }
    Ok(())
}

pub async fn create_product(state: &AppState, args: NewProduct) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    let image = match &args.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };
    let draft = ProductDraft {
        name: args.name,
        description: args.description,
        price: args.price,
        quantity: args.quantity,
        category_id: args.category,
        image,
    };
    let product = console.create_product(&draft).await?;
    log_product(&product);
    Ok(())
}

pub async fn delete_product(state: &AppState, id: ProductId) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    console.delete_product(id).await?;
    tracing::info!("Deleted product #{id}");
    Ok(())
}

pub async fn list_categories(state: &AppState) -> CommandResult {
    let categories = state.api().list_categories(false).await?;
    for category in &categories {
        tracing::info!("#{:<5} {} ({})", category.id, category.name, category.slug);
    }
    Ok(())
}

pub async fn create_category(state: &AppState, name: &str) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    let category = console.create_category(name).await?;
    tracing::info!("Created category #{} {}", category.id, category.name);
    Ok(())
}

pub async fn rename_category(state: &AppState, id: CategoryId, name: &str) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    let category = console.rename_category(id, name).await?;
    tracing::info!("Renamed category #{} to {}", category.id, category.name);
    Ok(())
}

pub async fn delete_category(state: &AppState, id: CategoryId) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    console.delete_category(id).await?;
    tracing::info!("Deleted category #{id}");
    Ok(())
}

async fn read_image(path: &Path) -> std::io::Result<ImageUpload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload {
        content_type: content_type(path).map(str::to_string),
        file_name,
        bytes,
    })
}

fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
