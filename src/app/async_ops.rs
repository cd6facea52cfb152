//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and the worker
//! task. The worker owns the HTTP client and never touches app state; every
//! result goes back over the channel tagged with what it answers.

use tokio::sync::mpsc;

use crate::api::{HttpClient, PostQuery, RecommendApi};
use crate::error::ApiResult;
use crate::models::{
    AuthResponse, Comment, LikeResponse, LoginRequest, NewPost, NewRoom, PendingLike, Post, Room,
};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Sign in with email and password
    Login { request: LoginRequest },
    /// Load the feed
    FetchPosts {
        token: Option<String>,
        query: PostQuery,
        generation: u64,
    },
    /// Load the user's rooms
    FetchRooms { token: String, generation: u64 },
    /// Load comments for a post
    FetchComments { post_id: String, generation: u64 },
    /// Send a like toggle already applied locally
    Like { token: String, pending: PendingLike },
    /// Publish a post
    CreatePost { token: String, post: NewPost },
    /// Create a room
    CreateRoom { token: String, room: NewRoom },
    /// Revoke the token on the server
    Logout { token: String },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Login finished
    LoggedIn(ApiResult<AuthResponse>),
    /// Feed load finished
    Posts {
        generation: u64,
        result: ApiResult<Vec<Post>>,
    },
    /// Rooms load finished
    Rooms {
        generation: u64,
        result: ApiResult<Vec<Room>>,
    },
    /// Comments load finished
    Comments {
        post_id: String,
        generation: u64,
        result: ApiResult<Vec<Comment>>,
    },
    /// Like toggle answered
    Liked {
        pending: PendingLike,
        result: ApiResult<LikeResponse>,
    },
    /// Post creation finished
    PostCreated(ApiResult<Post>),
    /// Room creation finished
    RoomCreated(ApiResult<Room>),
    /// Server logout finished (local state is already cleared)
    LoggedOut,
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(client: HttpClient) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, AsyncCommand::Shutdown) {
                break;
            }
            let result = execute(&client, cmd).await;
            if let Some(result) = result
                && result_tx.send(result).await.is_err()
            {
                tracing::debug!("UI dropped the result channel, stopping worker");
                break;
            }
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Run one command against the backend
pub async fn execute<A: RecommendApi>(api: &A, cmd: AsyncCommand) -> Option<AsyncResult> {
    let result = match cmd {
        AsyncCommand::Shutdown => return None,
        AsyncCommand::Login { request } => AsyncResult::LoggedIn(api.login(&request).await),
        AsyncCommand::FetchPosts {
            token,
            query,
            generation,
        } => AsyncResult::Posts {
            generation,
            result: api.posts(token.as_deref(), &query).await,
        },
        AsyncCommand::FetchRooms { token, generation } => AsyncResult::Rooms {
            generation,
            result: api.my_rooms(&token).await,
        },
        AsyncCommand::FetchComments {
            post_id,
            generation,
        } => {
            let result = api.comments(&post_id).await;
            AsyncResult::Comments {
                post_id,
                generation,
                result,
            }
        }
        AsyncCommand::Like { token, pending } => {
            let result = api.like(&token, &pending.post_id).await;
            AsyncResult::Liked { pending, result }
        }
        AsyncCommand::CreatePost { token, post } => {
            AsyncResult::PostCreated(api.create_post(&token, &post).await)
        }
        AsyncCommand::CreateRoom { token, room } => {
            AsyncResult::RoomCreated(api.create_room(&token, &room).await)
        }
        AsyncCommand::Logout { token } => {
            if let Err(e) = api.logout(&token).await {
                tracing::warn!("Server logout failed: {e}");
            }
            AsyncResult::LoggedOut
        }
    };
    Some(result)
}
