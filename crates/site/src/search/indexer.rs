//! Story index builder.
//!
//! Builds the story index from the database, or synchronously from
//! documents already in memory.

use sqlx::PgPool;
use tantivy::{Index, IndexWriter};
use tracing::{debug, info, instrument, warn};

use crate::db::StoryRepository;
use crate::models::StoryDocument;

use super::{STORY_TOKENIZER, SearchError, StoryFields, StoryIndex, story_analyzer};

/// Stories fetched per database round trip.
const PAGE_SIZE: i64 = 500;

/// Writer memory budget.
const WRITER_HEAP_BYTES: usize = 15_000_000;

/// Load every indexable story and swap a freshly built index into
/// `story_index`, returning the number of documents indexed.
///
/// The build itself runs on the blocking thread pool.
///
/// # Errors
///
/// Returns `SearchError::Build` if stories cannot be fetched or indexed.
#[instrument(skip_all)]
pub async fn rebuild(story_index: &StoryIndex, pool: &PgPool) -> Result<u64, SearchError> {
    let stories = fetch_indexable(pool).await?;

    let target = story_index.clone();
    let docs = tokio::task::spawn_blocking(move || target.load(&stories))
        .await
        .map_err(|e| SearchError::Build(format!("Index build task failed: {e}")))??;

    info!(docs, "Story index is now ready and serving requests");
    Ok(docs)
}

/// Page through every non-expired story.
async fn fetch_indexable(pool: &PgPool) -> Result<Vec<StoryDocument>, SearchError> {
    let repo = StoryRepository::new(pool);
    let mut stories = Vec::new();
    let mut after = None;

    loop {
        let page = repo
            .indexable_page(after, PAGE_SIZE)
            .await
            .map_err(|e| SearchError::Build(format!("Failed to fetch stories: {e}")))?;
        debug!(after = ?after, batch_size = page.len(), "Fetched stories page");

        let Some(last) = page.last() else {
            break;
        };
        after = Some(last.story.id);
        let done = i64::try_from(page.len()).unwrap_or(PAGE_SIZE) < PAGE_SIZE;
        stories.extend(page);
        if done {
            break;
        }
    }

    Ok(stories)
}

/// Build an in-memory index over `stories`.
///
/// Expired stories are skipped.
///
/// # Errors
///
/// Returns `SearchError::Build` if the writer cannot be created or the
/// commit fails.
#[instrument(skip_all, fields(candidates = stories.len()))]
pub fn build_index(stories: &[StoryDocument]) -> Result<(Index, StoryFields), SearchError> {
    let (schema, fields) = StoryIndex::build_schema();
    let index = Index::create_in_ram(schema);
    index.tokenizers().register(STORY_TOKENIZER, story_analyzer());

    let mut writer: IndexWriter = index
        .writer_with_num_threads(1, WRITER_HEAP_BYTES)
        .map_err(|e| SearchError::Build(format!("Failed to create writer: {e}")))?;

    let count = index_stories(stories, &writer, &fields);

    writer
        .commit()
        .map_err(|e| SearchError::Build(format!("Failed to commit index: {e}")))?;
    info!(count, "Story index built");

    Ok((index, fields))
}

/// Add each non-expired story to `writer`, returning how many were added.
fn index_stories(stories: &[StoryDocument], writer: &IndexWriter, fields: &StoryFields) -> usize {
    let mut count = 0;

    for doc in stories {
        let story = &doc.story;
        if story.is_expired {
            continue;
        }

        let tantivy_doc = tantivy::doc!(
            fields.short_id => story.short_id.as_str(),
            fields.title => story.title.as_str(),
            fields.url => story.url.as_deref().unwrap_or_default(),
            fields.description => story.description.as_str(),
            fields.author => doc.author.as_str(),
            fields.tags => doc.tags.join(" "),
            fields.created_at => story.created_at.timestamp(),
            fields.hotness => story.hotness,
            fields.is_expired => u64::from(story.is_expired),
            fields.score => story.score()
        );

        if let Err(e) = writer.add_document(tantivy_doc) {
            warn!(error = %e, short_id = %story.short_id, "Failed to index story");
        } else {
            count += 1;
        }
    }

    count
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use lobsters_core::{ShortId, StoryId, UserId};

    use super::*;
    use crate::models::Story;
    use crate::search::StorySort;

    fn story(id: i32, title: &str, description: &str) -> StoryDocument {
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        StoryDocument {
            story: Story {
                id: StoryId::new(id),
                short_id: ShortId::parse(&format!("s{id}")).unwrap(),
                user_id: UserId::new(1),
                title: title.to_string(),
                url: Some(format!("https://example.com/{id}")),
                description: description.to_string(),
                upvotes: id,
                downvotes: 0,
                hotness: -f64::from(id),
                is_expired: false,
                created_at: base + Duration::hours(i64::from(id)),
            },
            author: "alice".to_string(),
            tags: vec!["programming".to_string()],
        }
    }

    fn loaded(stories: &[StoryDocument]) -> StoryIndex {
        let index = StoryIndex::new();
        index.load(stories).unwrap();
        index
    }

    #[test]
    fn test_expired_stories_are_not_indexed() {
        let mut expired = story(2, "Rust compilers", "");
        expired.story.is_expired = true;
        let index = loaded(&[story(1, "Rust parsers", ""), expired]);

        assert_eq!(index.num_docs(), 1);
        let hits = index.search("rust", StorySort::Relevance, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].short_id, "s1");
    }

    #[test]
    fn test_title_match_outranks_description_match() {
        let index = loaded(&[
            story(1, "Unrelated", "all about ocaml"),
            story(2, "OCaml in production", "nothing here"),
        ]);

        let hits = index.search("ocaml", StorySort::Relevance, 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].short_id, "s2");
    }

    #[test]
    fn test_sorts_by_attributes() {
        let index = loaded(&[
            story(1, "Zig one", ""),
            story(3, "Zig three", ""),
            story(2, "Zig two", ""),
        ]);
        let order = |sort| -> Vec<String> {
            index
                .search("zig", sort, 10)
                .unwrap()
                .into_iter()
                .map(|h| h.short_id)
                .collect()
        };

        assert_eq!(order(StorySort::Newest), ["s3", "s2", "s1"]);
        assert_eq!(order(StorySort::Hottest), ["s3", "s2", "s1"]);
        assert_eq!(order(StorySort::Score), ["s3", "s2", "s1"]);
    }

    #[test]
    fn test_matches_author_tags_and_short_id() {
        let index = loaded(&[story(1, "Something", "")]);

        assert_eq!(index.search("alice", StorySort::Relevance, 10).unwrap().len(), 1);
        assert_eq!(
            index.search("Programming", StorySort::Relevance, 10).unwrap().len(),
            1
        );
        let hits = index.search("s1", StorySort::Relevance, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tags, ["programming"]);
        assert_eq!(hits[0].score, 1);
        assert_eq!(hits[0].url.as_deref(), Some("https://example.com/1"));
    }

    #[test]
    fn test_attribute_sorts_consider_every_match() {
        let stories: Vec<StoryDocument> = (1..=1_200).map(|id| story(id, "Zig", "")).collect();
        let index = loaded(&stories);
        let top = |sort| index.search("zig", sort, 1).unwrap()[0].short_id.clone();

        assert_eq!(top(StorySort::Newest), "s1200");
        assert_eq!(top(StorySort::Hottest), "s1200");
        assert_eq!(top(StorySort::Score), "s1200");
    }

    #[test]
    fn test_limit_truncates() {
        let index = loaded(&[story(1, "Go", ""), story(2, "Go", ""), story(3, "Go", "")]);
        assert_eq!(index.search("go", StorySort::Newest, 2).unwrap().len(), 2);
    }
}
