use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::{
    resource::{id_text, ListScope, Payload, Resource},
    schema::{Field, FieldKind},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum StoryStatus {
    #[default]
    #[serde(rename = "ongoing")]
    Ongoing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "unknown", other)]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ChapterStatus {
    #[default]
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "published")]
    Published,
    #[serde(rename = "unknown", other)]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum CategoryType {
    #[default]
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "good_list")]
    GoodList,
    #[serde(rename = "unknown", other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AuthorRef {
    #[serde(default, deserialize_with = "id_string")]
    pub author_id: String,
    #[serde(default, alias = "title", deserialize_with = "lenient")]
    pub author_title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url_key: String,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CategoryRef {
    #[serde(deserialize_with = "id_string")]
    pub category_id: String,
    #[serde(default, alias = "title", deserialize_with = "lenient")]
    pub category_name: String,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Story {
    #[serde(deserialize_with = "id_string")]
    pub story_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url_key: String,
    #[serde(default, deserialize_with = "lenient")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: StoryStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub is_full: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub is_hot: bool,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient")]
    pub translator: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total_chapters: u64,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub path_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Chapter {
    #[serde(deserialize_with = "id_string")]
    pub chapter_id: String,
    #[serde(default, deserialize_with = "id_string")]
    pub story_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub short_title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url_key: String,
    /// Reading position inside the story, unique per story
    #[serde(default, deserialize_with = "lenient")]
    pub ordered: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub status: ChapterStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub category_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url_key: String,
    /// Sort weight
    #[serde(default, deserialize_with = "lenient")]
    pub priority: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub type_category: CategoryType,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Author {
    #[serde(deserialize_with = "id_string")]
    pub author_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url_key: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

/// `null` decodes to the type's default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    Ok(id_text(&value).unwrap_or_default())
}

const STORY_STATUSES: &[&str] = &["ongoing", "completed"];
const CHAPTER_STATUSES: &[&str] = &["draft", "completed", "published"];
const CATEGORY_TYPES: &[&str] = &["category", "good_list"];

macro_rules! resource {
    (
        $entity:ident, $path:expr, $id:ident, $route_key:expr, $scope:expr,
        update: $update:expr,
        create: $create:expr,
        template: $template:expr $(,)?
    ) => {
        impl Resource for $entity {
            const PATH: &'static str = $path;
            const ID_KEY: &'static str = stringify!($id);
            const ROUTE_KEY: &'static str = $route_key;
            const LIST_SCOPE: ListScope = $scope;
            const UPDATE_FIELDS: &'static [Field] = $update;
            const CREATE_FIELDS: &'static [Field] = $create;

            fn id(&self) -> &str {
                &self.$id
            }

            fn title(&self) -> &str {
                &self.title
            }

            fn create_template() -> Payload {
                match $template {
                    Value::Object(template) => template,
                    _ => Payload::new(),
                }
            }
        }
    };
}

#[rustfmt::skip]
resource!(Story, "stories", story_id, "storyId", ListScope::Search,
    update: &[
        Field::text("title").required(),
        Field::text("description"),
        Field::timestamp("publish_date"),
        Field::flag("is_active", true),
        Field::choice("status", STORY_STATUSES),
        Field::flag("is_full", false),
        Field::flag("is_hot", false),
        Field::text("translator"),
        Field::text("source"),
        Field::new("author_id", FieldKind::Embedded { object: "author", key: "author_id" }),
        Field::new("path_image", FieldKind::Media),
        Field::new("categories", FieldKind::Refs { key: "category_id" }),
    ],
    create: &[
        Field::text("title").required(),
        Field::flag("is_active", true),
        Field::text("description"),
        Field::timestamp("publish_date"),
        Field::timestamp("updated_date"),
        Field::choice("status", STORY_STATUSES),
        Field::flag("is_full", false),
        Field::flag("is_hot", false),
        Field::text("source"),
        Field::text("translator"),
    ],
    template: json!({
        "story_id": "auto",
        "increment_id": 1,
        "url_key": "auto",
        "path_image": "",
        "author": { "author_id": "auto", "url_key": "auto", "author_title": "" },
        "total_chapters": 0,
        "categories": [],
    }),
);

#[rustfmt::skip]
resource!(Chapter, "chapters", chapter_id, "chapterId", ListScope::Parent,
    update: &[
        Field::text("title").required(),
        Field::text("short_title").required(),
        Field::integer("ordered").required(),
        Field::choice("status", CHAPTER_STATUSES),
        Field::text("content"),
        Field::timestamp("created_date"),
        Field::timestamp("updated_date"),
    ],
    create: &[
        Field::text("story_id").required(),
        Field::text("title").required(),
        Field::text("short_title").required(),
        Field::integer("ordered").required(),
        Field::choice("status", CHAPTER_STATUSES),
        Field::text("content"),
        Field::timestamp("created_date"),
        Field::timestamp("updated_date"),
    ],
    template: json!({
        "chapter_id": "auto",
        "increment_id": 1,
        "url_key": "auto",
    }),
);

#[rustfmt::skip]
resource!(Category, "categories", category_id, "categoryId", ListScope::Search,
    update: &[
        Field::text("title").required(),
        Field::integer("priority").required(),
        Field::choice("type_category", CATEGORY_TYPES),
        Field::text("description"),
    ],
    create: &[
        Field::text("title").required(),
        Field::integer("priority").required(),
        Field::choice("type_category", CATEGORY_TYPES),
        Field::text("description"),
    ],
    template: json!({
        "category_id": "auto",
        "increment_id": 1,
        "url_key": "auto",
    }),
);

#[rustfmt::skip]
resource!(Author, "authors", author_id, "authorId", ListScope::Search,
    update: &[
        Field::text("title").required(),
        Field::text("description"),
        Field::timestamp("created_date"),
        Field::timestamp("updated_date"),
    ],
    create: &[
        Field::text("title").required(),
        Field::text("description"),
        Field::timestamp("created_date"),
        Field::timestamp("updated_date"),
    ],
    template: json!({
        "author_id": "auto",
        "url_key": "auto",
    }),
);
