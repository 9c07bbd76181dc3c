mod support;

use drizzle2typeorm::convert::{convert_sources, ConvertOptions};
use drizzle2typeorm::error::Error;
use drizzle2typeorm::generator::model::{DefaultValue, RelationType, SourceFile};
use support::{convert_fixture, convert_inline, entity, load_fixture_sources, relation};

const BLOG: [&str; 3] = ["users.ts", "posts.ts", "index.ts"];

/// Full pipeline over the blog fixture.
/// This is the primary acceptance test.
#[test]
fn end_to_end_blog_schema() {
    let conversion = convert_fixture("blog", &BLOG);

    assert_eq!(
        conversion.outputs.keys().collect::<Vec<_>>(),
        vec!["posts.js", "users.js"],
        "index.ts declares no tables and should produce no output"
    );
    insta::assert_snapshot!("blog_users_schema", &conversion.outputs["users.js"]);
}

#[test]
fn uuid_primary_key_name_and_created_at_columns() {
    let conversion = convert_fixture("blog", &BLOG);
    let users = entity(&conversion, "Users");

    let id = users.column("id").expect("id column");
    assert_eq!(id.column_type, "uuid");
    assert!(id.primary);
    assert_eq!(id.generated.as_deref(), Some("uuid"));
    assert!(!id.nullable);

    let name = users.column("name").expect("name column");
    assert_eq!(name.column_type, "varchar");
    assert!(!name.nullable);

    let created_at = users.column("createdAt").expect("createdAt column");
    assert_eq!(created_at.column_type, "timestamp");
    assert!(created_at.create_date);
    assert!(!created_at.nullable);
    assert_eq!(created_at.default, None);
}

#[test]
fn one_to_many_pairs_with_many_to_one_owner() {
    let conversion = convert_fixture("blog", &BLOG);

    let posts = relation(&conversion, "Users", "posts");
    assert_eq!(posts.rel_type, RelationType::OneToMany);
    assert_eq!(posts.inverse_side.as_deref(), Some("author"));
    assert!(!posts.is_owner);

    let author = relation(&conversion, "Posts", "author");
    assert_eq!(author.rel_type, RelationType::ManyToOne);
    assert_eq!(author.inverse_side.as_deref(), Some("posts"));
    assert_eq!(author.join_column_name.as_deref(), Some("author_id"));
    assert!(author.is_owner);
    assert_eq!(author.on_delete.as_deref(), Some("cascade"));

    let output = &conversion.outputs["posts.js"];
    assert!(
        output.contains(
            "    author: {\n      target: 'Users',\n      type: 'many-to-one',\n      inverseSide: 'posts',\n      joinColumn: { name: 'author_id' },\n      onDelete: 'CASCADE',\n    },\n"
        ),
        "unexpected posts relation block:\n{output}"
    );
}

#[test]
fn mutual_to_many_becomes_many_to_many_with_one_owner() {
    let conversion = convert_fixture("many_to_many", &["courses.ts", "students.ts"]);

    let students = relation(&conversion, "Courses", "students");
    let courses = relation(&conversion, "Students", "courses");
    assert_eq!(students.rel_type, RelationType::ManyToMany);
    assert_eq!(courses.rel_type, RelationType::ManyToMany);
    assert_eq!(students.inverse_side.as_deref(), Some("courses"));
    assert_eq!(courses.inverse_side.as_deref(), Some("students"));
    assert!(students.is_owner, "first processed side should own the join table");
    assert!(!courses.is_owner);

    assert!(conversion.outputs["courses.js"].contains("      joinTable: true,\n"));
    assert!(!conversion.outputs["students.js"].contains("joinTable"));
}

#[test]
fn composite_unique_index_keeps_column_order() {
    let conversion = convert_fixture("blog", &BLOG);
    let posts = entity(&conversion, "Posts");

    assert_eq!(posts.indices.len(), 1);
    let index = &posts.indices[0];
    assert_eq!(index.name, "posts_title_author_idx");
    assert_eq!(index.columns, vec!["title", "authorId"]);
    assert!(index.unique);

    assert!(conversion.outputs["posts.js"].contains(
        "  indices: [\n    {\n      name: 'posts_title_author_idx',\n      columns: ['title', 'authorId'],\n      unique: true,\n    },\n  ],\n"
    ));
}

#[test]
fn current_timestamp_template_default_is_normalized() {
    let conversion = convert_fixture("blog", &BLOG);
    let published = entity(&conversion, "Posts")
        .column("publishedAt")
        .expect("publishedAt column");

    assert_eq!(
        published.default,
        Some(DefaultValue::Str("CURRENT_TIMESTAMP".to_string()))
    );
    let output = &conversion.outputs["posts.js"];
    assert!(output.contains("      default: 'CURRENT_TIMESTAMP',\n"));
    assert!(!output.contains("sql`"));
}

#[test]
fn unknown_column_builder_falls_back_to_text() {
    let conversion = convert_fixture("blog", &BLOG);
    let price = entity(&conversion, "Posts").column("price").expect("price column");
    assert_eq!(price.column_type, "text");
    assert!(price.nullable);
}

#[test]
fn serial_and_update_timestamp_columns() {
    let conversion = convert_fixture("blog", &BLOG);
    let posts = entity(&conversion, "Posts");

    let id = posts.column("id").expect("id column");
    assert_eq!(id.column_type, "int");
    assert_eq!(id.generated.as_deref(), Some("increment"));

    let updated_at = posts.column("updatedAt").expect("updatedAt column");
    assert!(updated_at.update_date);
    assert_eq!(updated_at.default, Some(DefaultValue::Computed));

    let views = posts.column("views").expect("views column");
    assert_eq!(views.default, Some(DefaultValue::Number(0.0)));
    assert!(conversion.outputs["posts.js"].contains("      default: 0,\n"));
}

#[test]
fn identical_input_produces_identical_output() {
    let first = convert_fixture("blog", &BLOG);
    let second = convert_fixture("blog", &BLOG);
    assert_eq!(first.outputs, second.outputs);
}

#[test]
fn not_null_and_primary_key_columns_are_never_nullable() {
    let conversion = convert_fixture("blog", &BLOG);
    for file in ["users.js", "posts.js"] {
        let output = &conversion.outputs[file];
        for block in output.split("    },\n") {
            if block.contains("      primary: true,\n") {
                assert!(
                    block.contains("      nullable: false,\n"),
                    "primary column should not be nullable in {file}:\n{block}"
                );
            }
        }
    }
    let title = entity(&conversion, "Posts").column("title").expect("title column");
    assert!(!title.nullable);
}

#[test]
fn plain_one_to_one_without_foreign_key_has_no_owner() {
    let conversion = convert_inline(&[(
        "accounts.ts",
        r#"
        import { pgTable, uuid, relations } from "drizzle-orm/pg-core";

        export const accounts = pgTable("accounts", { id: uuid("id").primaryKey() });
        export const settings = pgTable("settings", { id: uuid("id").primaryKey() });

        export const accountsRelations = relations(accounts, ({ one }) => ({
          settings: one(settings),
        }));
        export const settingsRelations = relations(settings, ({ one }) => ({
          account: one(accounts),
        }));
        "#,
    )]);

    let forward = relation(&conversion, "Accounts", "settings");
    let backward = relation(&conversion, "Settings", "account");
    assert_eq!(forward.rel_type, RelationType::OneToOne);
    assert_eq!(backward.rel_type, RelationType::OneToOne);
    assert_eq!(forward.inverse_side.as_deref(), Some("account"));
    assert_eq!(backward.inverse_side.as_deref(), Some("settings"));
    assert!(!forward.is_owner && !backward.is_owner);
    assert!(!conversion.outputs["accounts.js"].contains("joinColumn"));
}

#[test]
fn one_to_one_owner_is_the_side_that_resolved_a_join_column() {
    let conversion = convert_inline(&[(
        "profiles.ts",
        r#"
        export const users = pgTable("users", { id: uuid("id").primaryKey() });
        export const profiles = pgTable("profiles", {
          id: uuid("id").primaryKey(),
          userId: uuid("user_id").references(() => users.id),
        });

        export const profilesRelations = relations(profiles, ({ one }) => ({
          user: one(users),
        }));
        export const usersRelations = relations(users, ({ one }) => ({
          profile: one(profiles),
        }));
        "#,
    )]);

    let user = relation(&conversion, "Profiles", "user");
    let profile = relation(&conversion, "Users", "profile");
    assert_eq!(user.rel_type, RelationType::OneToOne);
    assert_eq!(profile.rel_type, RelationType::OneToOne);
    assert_eq!(profile.join_column_name.as_deref(), Some("user_id"));
    assert_eq!(user.join_column_name, None);
    assert!(profile.is_owner);
    assert!(!user.is_owner);
}

#[test]
fn unpaired_relation_keeps_its_heuristic_type() {
    let conversion = convert_inline(&[(
        "tags.ts",
        r#"
        export const tags = pgTable("tags", { id: serial("id").primaryKey() });
        export const tagsRelations = relations(tags, ({ many }) => ({
          aliases: many(tagAliases),
        }));
        "#,
    )]);

    let aliases = relation(&conversion, "Tags", "aliases");
    assert_eq!(aliases.rel_type, RelationType::OneToMany);
    assert_eq!(aliases.to_entity, "TagAliases");
    assert_eq!(aliases.inverse_side, None);
}

#[test]
fn parse_error_aborts_the_whole_batch() {
    let mut sources = load_fixture_sources("blog", &BLOG);
    sources.push(SourceFile::new(
        "broken.ts",
        "export const broken = pgTable(\"broken\", { id: uuid(\"id\"). });",
    ));

    let err = convert_sources(&sources, &ConvertOptions::default())
        .expect_err("malformed source should fail the batch");
    match err {
        Error::Parse { file, .. } => assert_eq!(file, "broken.ts"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn custom_output_extension_is_applied() {
    let options = ConvertOptions {
        output_extension: "mjs".to_string(),
        ..ConvertOptions::default()
    };
    let conversion = convert_sources(&load_fixture_sources("blog", &BLOG), &options)
        .expect("fixture should convert");
    assert!(conversion.outputs.contains_key("users.mjs"));
    assert!(conversion.outputs.contains_key("posts.mjs"));
}
