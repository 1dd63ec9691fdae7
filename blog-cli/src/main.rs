use blog_client::{Auth, BlogClientHttp, NewPost, PostUpdate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const TOKEN_FILE: &str = ".blog_token";

#[derive(Parser, Debug)]
#[clap(about = "Admin tool for the blog CMS")]
struct Cli {
    #[clap(short, long, env = "BLOG_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Name of the session cookie the server expects.
    #[clap(long, env = "BLOG_SESSION_COOKIE", default_value = "blog-session")]
    session_cookie: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stores credentials in `.blog_token` for later commands.
    Login {
        #[clap(long, conflicts_with = "jwt", required_unless_present = "jwt")]
        session: Option<String>,
        #[clap(long)]
        jwt: Option<String>,
    },
    Logout,
    Health,
    ListPosts {
        #[clap(long, default_value_t = 1)]
        page: usize,
        /// Include drafts (admin only).
        #[clap(long)]
        all: bool,
        #[clap(long)]
        category: Option<String>,
    },
    GetPost {
        #[clap(long, conflicts_with = "slug", required_unless_present = "slug")]
        id: Option<String>,
        #[clap(long)]
        slug: Option<String>,
        #[clap(long)]
        related: Option<usize>,
    },
    Search {
        query: String,
    },
    Tags {
        #[clap(long)]
        tag: Option<String>,
        #[clap(long, default_value_t = 1)]
        page: usize,
    },
    Popular {
        #[clap(long, default_value_t = 5)]
        limit: usize,
    },
    CreatePost {
        #[clap(long)]
        title: String,
        #[clap(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,
        #[clap(long)]
        content_file: Option<PathBuf>,
        #[clap(long = "category")]
        categories: Vec<String>,
        #[clap(long)]
        keywords: Option<String>,
        #[clap(long)]
        publish: bool,
    },
    UpdatePost {
        id: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        slug: Option<String>,
        #[clap(long)]
        content: Option<String>,
        #[clap(long)]
        keywords: Option<String>,
        #[clap(long, value_parser = ["published", "draft"])]
        status: Option<String>,
    },
    DeletePost {
        id: String,
    },
    Categories,
    CreateCategory {
        name: String,
    },
    RenameCategory {
        id: String,
        name: String,
    },
    DeleteCategory {
        id: String,
    },
    Files,
    Upload {
        path: PathBuf,
    },
    DeleteFile {
        id: String,
    },
    Videos {
        #[clap(long)]
        max: Option<u32>,
    },
    Suggest {
        #[clap(value_parser = ["title", "description", "keywords", "evaluate"])]
        kind: String,
        content: String,
    },
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let token_file = Path::new(TOKEN_FILE);

    let mut client = BlogClientHttp::connect(&args.server)?.with_session_cookie(&args.session_cookie);
    client.set_auth(Auth::load(token_file)?);

    match args.command {
        Command::Login { session, jwt } => {
            let auth = match (session, jwt) {
                (Some(secret), _) => Auth::Session(secret),
                (None, Some(token)) => Auth::Jwt(token),
                (None, None) => return Err("pass --session or --jwt".into()),
            };
            auth.save(token_file)?;
            println!("Credentials saved to {TOKEN_FILE}");
        }
        Command::Logout => {
            if token_file.exists() {
                std::fs::remove_file(token_file)?;
            }
            println!("Logged out");
        }
        Command::Health => {
            client.health().await?;
            println!("Server is up");
        }
        Command::ListPosts {
            page,
            all,
            category,
        } => {
            let result = match category {
                Some(category) => client.posts_in_category(&category, page).await?,
                None => client.list_posts(page, all).await?,
            };
            println!(
                "Page {}/{} ({} posts)",
                result.page, result.total_pages, result.total
            );
            for post in result.posts {
                println!("- {post}");
            }
        }
        Command::GetPost { id, slug, related } => match (id, slug) {
            (Some(id), _) => {
                let post = client.get_post(&id).await?;
                println!("{post}\n\n{}", post.content);
            }
            (None, Some(slug)) => {
                let detail = client.get_post_by_slug(&slug, related).await?;
                println!("{}\n\n{}", detail.post, detail.post.content);
                if !detail.related.is_empty() {
                    println!("\nRelated:");
                    for post in detail.related {
                        println!("- {post}");
                    }
                }
            }
            (None, None) => return Err("pass --id or --slug".into()),
        },
        Command::Search { query } => {
            let posts = client.search_posts(&query).await?;
            println!("{} result(s)", posts.len());
            for post in posts {
                println!("- {post}");
            }
        }
        Command::Tags { tag, page } => match tag {
            Some(tag) => {
                let result = client.posts_by_tag(&tag, page, None).await?;
                println!("#{tag}: page {}/{}", result.page, result.total_pages);
                for post in result.posts {
                    println!("- {post}");
                }
            }
            None => {
                for tag in client.tags().await? {
                    println!("{:<24} {:>4}  ({})", tag.name, tag.post_count, tag.slug);
                }
            }
        },
        Command::Popular { limit } => {
            for post in client.popular_posts(limit).await? {
                println!("- {post}");
            }
        }
        Command::CreatePost {
            title,
            content,
            content_file,
            categories,
            keywords,
            publish,
        } => {
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => return Err("pass --content or --content-file".into()),
            };
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    category: categories,
                    status: Some(if publish { "published" } else { "draft" }.to_string()),
                    keywords,
                    ..Default::default()
                })
                .await?;
            println!("Post created! {post}");
        }
        Command::UpdatePost {
            id,
            title,
            slug,
            content,
            keywords,
            status,
        } => {
            let post = client
                .update_post(&PostUpdate {
                    id,
                    title,
                    slug,
                    content,
                    keywords,
                    status,
                    ..Default::default()
                })
                .await?;
            println!("Post updated: {post}");
        }
        Command::DeletePost { id } => {
            client.delete_post(&id).await?;
            println!("Post deleted!");
        }
        Command::Categories => {
            for category in client.list_categories().await? {
                println!("{:<36} {}", category.id, category.name);
            }
        }
        Command::CreateCategory { name } => {
            let category = client.create_category(&name).await?;
            println!("Category created! ID: {}", category.id);
        }
        Command::RenameCategory { id, name } => {
            let category = client.rename_category(&id, &name).await?;
            println!("Category renamed: {} -> {}", category.id, category.name);
        }
        Command::DeleteCategory { id } => {
            client.delete_category(&id).await?;
            println!("Category deleted!");
        }
        Command::Files => {
            for file in client.list_files().await? {
                println!("{} {} ({} bytes) {}", file.id, file.name, file.size, file.url);
            }
        }
        Command::Upload { path } => {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or("upload path has no file name")?
                .to_string();
            let bytes = std::fs::read(&path)?;
            let file = client
                .upload_file(&filename, content_type(&path), bytes)
                .await?;
            println!("Uploaded: {}", file.url);
        }
        Command::DeleteFile { id } => {
            client.delete_file(&id).await?;
            println!("File deleted!");
        }
        Command::Videos { max } => {
            for video in client.latest_videos(max).await? {
                println!("{} ({} views) {}", video.title, video.view_count, video.url);
            }
        }
        Command::Suggest { kind, content } => {
            println!("{}", client.suggest(&kind, &content).await?);
        }
    }

    Ok(())
}
