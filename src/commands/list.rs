//! List the posts known to the CMS

use anyhow::Result;

use crate::helpers::DateFormatter;
use crate::pagination::PaginationState;
use crate::Blog;

/// Page size used while walking the listing
const LIST_PAGE_SIZE: usize = 100;

/// Print every post: date, slug, title and author
pub async fn run(blog: &Blog) -> Result<()> {
    let dates = DateFormatter::from_config(&blog.config)?;

    let first = blog.cms.query_posts(LIST_PAGE_SIZE).await?;
    let mut state = PaginationState::new(first);
    while state.has_more() {
        state.load_more(&blog.cms).await?;
    }

    let posts = state.posts();
    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = dates
            .format_opt(post.first_publication_date.as_ref())
            .unwrap_or_else(|| "-".to_string());
        println!("  {} - {} [{}] by {}", date, post.title, post.slug, post.author);
    }

    Ok(())
}
