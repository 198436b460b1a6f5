//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let stats = generator.generate().await?;

    tracing::info!(
        "Generated {} listing pages ({} posts) and {} post pages",
        stats.listing_pages,
        stats.listed_posts,
        stats.post_pages
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
