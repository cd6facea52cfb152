//! irecommend - share recommendations from your terminal
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use irecommend::api::{HttpClient, PostQuery, RecommendApi};
use irecommend::auth::AuthState;
use irecommend::models::{
    ActionType, LoginRequest, NewPost, NewRoom, Post, ROOM_COLORS, RecommendationType, parse_tags,
};
use irecommend::storage::{EncryptedFileStore, SharedStore};
use irecommend::theme::ThemeState;
use irecommend::Config;

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = parse_args()?;
    match command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            print_version();
            return Ok(());
        }
        Command::Demo => return irecommend::app::run_demo(Config::load()?),
        _ => {}
    }

    // The TUI loop blocks on channel sends, so it must not run inside the runtime
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let mut cli = Cli::open()?;

    match command {
        Command::Run => irecommend::app::run(&rt, cli.config, cli.store, cli.client),
        Command::Login { email } => rt.block_on(cli.login(email)),
        Command::Session { session_id } => rt.block_on(cli.exchange_session(&session_id)),
        Command::Logout => {
            rt.block_on(cli.auth.sign_out(&cli.client));
            println!("✓ Signed out");
            Ok(())
        }
        Command::Whoami => rt.block_on(cli.whoami()),
        Command::Feed { limit, filter } => {
            let mut query = filter;
            query.limit = limit.unwrap_or(cli.config.post_limit);
            rt.block_on(cli.feed(&query))
        }
        Command::Rooms => rt.block_on(cli.rooms()),
        Command::CreateRoom { name, color } => rt.block_on(cli.create_room(&name, &color)),
        Command::Post { post, image } => rt.block_on(cli.post(post, image)),
        Command::Like { post_id } => rt.block_on(cli.like(&post_id)),
        Command::Comments { post_id } => rt.block_on(cli.comments(&post_id)),
        Command::Theme { mode } => cli.theme(mode.as_deref()),
        Command::Demo | Command::Help | Command::Version => Ok(()),
    }
}

/// CLI commands
enum Command {
    Run,
    Demo,
    Login {
        email: Option<String>,
    },
    Session {
        session_id: String,
    },
    Logout,
    Whoami,
    Feed {
        /// `--limit`, or the configured page size
        limit: Option<usize>,
        filter: PostQuery,
    },
    Rooms,
    CreateRoom {
        name: String,
        color: String,
    },
    Post {
        post: NewPost,
        image: Option<PathBuf>,
    },
    Like {
        post_id: String,
    },
    Comments {
        post_id: String,
    },
    Theme {
        mode: Option<String>,
    },
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();
    parse_command(&args)
}

/// Value following any of `names` in `args`
fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], names: &[&str]) -> bool {
    args.iter().any(|a| names.contains(&a.as_str()))
}

fn required(args: &[String], index: usize, what: &str) -> Result<String> {
    args.get(index)
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing {what}\nRun 'irecommend --help' for usage"))
}

fn parse_command(args: &[String]) -> Result<Command> {
    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "--demo" | "demo" => Ok(Command::Demo),

        "login" => Ok(Command::Login {
            email: args.get(2).cloned(),
        }),
        "session" => Ok(Command::Session {
            session_id: required(args, 2, "session id")?,
        }),
        "logout" => Ok(Command::Logout),
        "whoami" | "me" => Ok(Command::Whoami),

        "feed" => {
            let limit = flag_value(args, &["--limit", "-l"])
                .map(|s| s.parse::<usize>())
                .transpose()
                .context("--limit must be a number")?;
            let mut query = PostQuery::latest(0);
            query.skip = flag_value(args, &["--skip"])
                .map(|s| s.parse::<usize>())
                .transpose()
                .context("--skip must be a number")?
                .unwrap_or(0);
            if let Some(room) = flag_value(args, &["--room", "-r"]) {
                query = query.in_room(room);
            }
            if let Some(user) = flag_value(args, &["--user", "-u"]) {
                query = query.by_user(user.trim_start_matches('@'));
            }
            Ok(Command::Feed {
                limit,
                filter: query,
            })
        }

        "rooms" => Ok(Command::Rooms),
        "room" => match args.get(2).map(String::as_str) {
            Some("create") => Ok(Command::CreateRoom {
                name: required(args, 3, "room name")?,
                color: flag_value(args, &["--color", "-c"])
                    .unwrap_or_else(|| ROOM_COLORS[0].to_string()),
            }),
            Some("list") | None => Ok(Command::Rooms),
            Some(other) => Err(anyhow::anyhow!("Unknown room command: {other}")),
        },

        "post" => {
            let mut post = NewPost::new(
                &required(args, 2, "room id")?,
                &required(args, 3, "title")?,
                &required(args, 4, "description")?,
            );
            if let Some(tags) = flag_value(args, &["--tags", "-t"]) {
                post.tags = parse_tags(&tags);
            }
            if let Some(link) = flag_value(args, &["--link"]) {
                post.external_link = link;
            }
            if has_flag(args, &["--not", "--warn"]) {
                post.recommendation_type = RecommendationType::NotRecommend;
            }
            if let Some(action) = flag_value(args, &["--action", "-a"]) {
                post.action_type = ActionType::from_str(&action)
                    .ok_or_else(|| anyhow::anyhow!("Unknown action: {action} (buy, listen, watch, read)"))?;
            }
            let image = flag_value(args, &["--image", "-i"]).map(PathBuf::from);
            Ok(Command::Post { post, image })
        }

        "like" => Ok(Command::Like {
            post_id: required(args, 2, "post id")?,
        }),
        "comments" => Ok(Command::Comments {
            post_id: required(args, 2, "post id")?,
        }),
        "theme" => Ok(Command::Theme {
            mode: args.get(2).cloned(),
        }),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'irecommend --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
⭐ i-Recommend - share what you love (and what to avoid)

USAGE:
    irecommend                         Launch TUI
    irecommend [COMMAND]

COMMANDS:
    demo                               Launch TUI with sample data
    login [email]                      Sign in with email and password
    session <session_id>               Sign in with an external session id
    logout                             Sign out and revoke the session
    whoami                             Show the signed-in user

    feed [OPTIONS]                     Show recent recommendations
      -r, --room <id>                  Only posts in this room
      -u, --user <username>            Only posts by this user
      -l, --limit <n>                  Number of posts (default: post_limit)
          --skip <n>                   Skip the newest n posts

    rooms                              List your rooms
    room create <name> [--color hex]   Create a room

    post <room_id> <title> <description> [OPTIONS]
      -t, --tags <a,b,c>               Comma-separated tags
          --link <url>                 Link to the thing
          --not                        Recommend against it
      -a, --action <action>            buy, listen, watch or read
      -i, --image <file>               Attach an image
      Example:
        irecommend post 1 "Great ramen" "Rich broth, quick service" --tags ramen,food

    like <post_id>                     Like/unlike a post
    comments <post_id>                 Show comments on a post
    theme [dark|light|toggle]          Show or set the display mode

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Tab / 1-4     Switch view
    j/k           Move down/up
    L             Like/unlike
    o             Open link in browser
    n             New recommendation
    c             New room (Rooms view)
    r             Refresh
    t             Toggle dark/light mode
    ?             Help

ENVIRONMENT:
    {}                Backend URL override
    RUST_LOG                           Log filter (default: warn)

CONFIG:
    {}
"#,
        irecommend::LOGO,
        irecommend::config::BACKEND_URL_ENV,
        config_path
    );
}

fn print_version() {
    println!("irecommend {}", irecommend::VERSION);
}

/// Everything a CLI command needs
struct Cli {
    config: Config,
    store: SharedStore,
    client: HttpClient,
    auth: AuthState<SharedStore>,
}

impl Cli {
    fn open() -> Result<Self> {
        let config = Config::load()?;
        let store: SharedStore =
            Arc::new(EncryptedFileStore::open_default().context("Failed to open local storage")?);
        let client = irecommend::api::client(&config)?;
        let auth = AuthState::new(store.clone());
        Ok(Self {
            config,
            store,
            client,
            auth,
        })
    }

    /// Token of the stored session, or an error telling the user to sign in
    fn require_token(&self) -> Result<String> {
        self.auth
            .token()
            .ok_or_else(|| anyhow::anyhow!("Not signed in. Run: irecommend login"))
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => prompt("Email:")?,
        };
        let password = prompt("Password:")?;
        let request = LoginRequest::new(&email, &password)?;

        let response = self
            .client
            .login(&request)
            .await
            .map_err(|e| match e {
                irecommend::ApiError::Unauthorized => anyhow::anyhow!("Invalid email or password"),
                other => other.into(),
            })?;
        let handle = response.user.handle();
        self.auth
            .begin_session(&response.access_token, response.user)
            .context("Failed to save session")?;

        println!("✓ Signed in as {handle}");
        Ok(())
    }

    async fn exchange_session(&mut self, session_id: &str) -> Result<()> {
        let response = self
            .client
            .process_session(session_id)
            .await
            .context("Session exchange failed")?;
        let handle = response.user.handle();
        self.auth
            .begin_session(&response.access_token, response.user)
            .context("Failed to save session")?;

        println!("✓ Signed in as {handle}");
        Ok(())
    }

    async fn whoami(&mut self) -> Result<()> {
        self.auth.restore(&self.client).await;
        let Some(user) = self.auth.user() else {
            println!("Not signed in.");
            println!("\nSign in with:");
            println!("  irecommend login");
            return Ok(());
        };

        println!("{} {}", user.name, user.handle());
        if !user.email.is_empty() {
            println!("  {}", user.email);
        }
        if let Some(bio) = &user.bio {
            println!("  {bio}");
        }
        println!(
            "  {} followers · {} following",
            user.follower_count, user.following_count
        );
        Ok(())
    }

    async fn feed(&mut self, query: &PostQuery) -> Result<()> {
        let token = self.auth.token();
        let result = self.client.posts(token.as_deref(), query).await;
        let posts = self.auth.observe(result).context("Failed to load feed")?;

        if posts.is_empty() {
            println!("No recommendations yet.");
            return Ok(());
        }
        for post in &posts {
            print_post(post);
        }
        Ok(())
    }

    async fn rooms(&mut self) -> Result<()> {
        let token = self.require_token()?;
        let result = self.client.my_rooms(&token).await;
        let rooms = self.auth.observe(result).context("Failed to load rooms")?;

        if rooms.is_empty() {
            println!("No rooms yet.");
            println!("\nCreate one with:");
            println!("  irecommend room create <name>");
            return Ok(());
        }

        println!("Your rooms:\n");
        for room in rooms {
            println!(
                "  {:<8} {:<30} {} · {} posts",
                room.id, room.name, room.color, room.post_count
            );
        }
        Ok(())
    }

    async fn create_room(&mut self, name: &str, color: &str) -> Result<()> {
        let token = self.require_token()?;
        let room = NewRoom::new(name, color)?;
        let result = self.client.create_room(&token, &room).await;
        let created = self.auth.observe(result).context("Failed to create room")?;

        println!("✓ Created room \"{}\" (id {})", created.name, created.id);
        Ok(())
    }

    async fn post(&mut self, post: NewPost, image: Option<PathBuf>) -> Result<()> {
        let token = self.require_token()?;
        let mut post = post.validated()?;
        if let Some(path) = image {
            post = post.with_image_file(&path)?;
        }

        let result = self.client.create_post(&token, &post).await;
        let created = self.auth.observe(result).context("Failed to publish post")?;

        println!("✓ Posted \"{}\" in {}", created.title, created.room.name);
        Ok(())
    }

    async fn like(&mut self, post_id: &str) -> Result<()> {
        let token = self.require_token()?;
        let result = self.client.like(&token, post_id).await;
        let response = self.auth.observe(result).context("Failed to like post")?;

        let verb = if response.liked { "Liked" } else { "Unliked" };
        println!("✓ {verb} ({} likes)", response.like_count);
        Ok(())
    }

    async fn comments(&mut self, post_id: &str) -> Result<()> {
        let comments = self
            .client
            .comments(post_id)
            .await
            .context("Failed to load comments")?;

        if comments.is_empty() {
            println!("No comments yet.");
            return Ok(());
        }
        for comment in comments {
            println!("\n@{} · {}", comment.user.username, comment.relative_time());
            println!("{}", comment.content);
        }
        Ok(())
    }

    fn theme(&self, mode: Option<&str>) -> Result<()> {
        let mut theme = ThemeState::new(self.store.clone());
        theme.initialize_theme();

        match mode {
            None => {}
            Some("dark") => theme.set_theme(true),
            Some("light") => theme.set_theme(false),
            Some("toggle") => theme.toggle_theme(),
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "Unknown mode: {other}\nSupported: dark, light, toggle"
                ));
            }
        }

        println!("Theme: {}", theme.mode_name());
        Ok(())
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label} ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn print_post(post: &Post) {
    println!(
        "\n[{}] {} {} · @{} in {} · {}",
        post.id,
        post.recommendation_type.emoji(),
        post.title,
        post.user.username,
        post.room.name,
        post.relative_time()
    );
    println!("{}", post.description);
    if !post.tags.is_empty() {
        println!("{}", post.hashtags());
    }
    if let Some(label) = post.media_label() {
        println!("{label}");
    }
    if let Some(link) = &post.external_link {
        println!("🔗 {link}");
    }
    println!(
        "{} {}  ♥ {}  💬 {}  ↻ {}",
        post.action_type.emoji(),
        post.action_type.name(),
        post.like_count,
        post.comment_count,
        post.repost_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        std::iter::once("irecommend")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_args_runs_tui() {
        assert!(matches!(parse_command(&args("")), Ok(Command::Run)));
        assert!(matches!(parse_command(&args("--demo")), Ok(Command::Demo)));
    }

    #[test]
    fn test_feed_flags() {
        let Ok(Command::Feed { limit, filter: query }) =
            parse_command(&args("feed --room 3 --user @alexc -l 5 --skip 10"))
        else {
            panic!("expected feed command");
        };
        assert_eq!(limit, Some(5));
        assert_eq!(query.skip, 10);
        assert_eq!(query.room_id.as_deref(), Some("3"));
        assert_eq!(query.username.as_deref(), Some("alexc"));

        assert!(parse_command(&args("feed --limit many")).is_err());
    }

    #[test]
    fn test_post_flags() {
        let Ok(Command::Post { post, image }) =
            parse_command(&args("post 1 Ramen Broth --tags a,b --not --action read"))
        else {
            panic!("expected post command");
        };
        assert_eq!(post.room_id, "1");
        assert_eq!(post.tags, vec!["a", "b"]);
        assert_eq!(post.recommendation_type, RecommendationType::NotRecommend);
        assert_eq!(post.action_type, ActionType::Read);
        assert!(image.is_none());

        assert!(parse_command(&args("post 1 Ramen")).is_err());
        assert!(parse_command(&args("post 1 Ramen Broth --action eat")).is_err());
    }

    #[test]
    fn test_room_create_defaults_color() {
        let Ok(Command::CreateRoom { name, color }) = parse_command(&args("room create Coffee"))
        else {
            panic!("expected room create");
        };
        assert_eq!(name, "Coffee");
        assert_eq!(color, ROOM_COLORS[0]);
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_command(&args("frobnicate")).is_err());
        assert!(parse_command(&args("session")).is_err());
    }
}
