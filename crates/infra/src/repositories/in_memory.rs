//! Process-local storage backend.
//!
//! Mirrors the Postgres constraints the service relies on (unique username
//! and email, foreign keys, cascading deletes) so both backends answer the
//! same way. State is lost when the process exits.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use socialnet_core::{Follow, Post, PostDraft, PostId, User, UserChanges, UserId};

use super::{
    FollowerRepository, NewUserRecord, PostRepository, RepositoryError, RepositoryResult,
    UserRepository,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    posts: HashMap<PostId, Post>,
    followers: HashSet<Follow>,
    last_created: DateTime<Utc>,
}

impl State {
    /// Strictly increasing creation time, so "newest first" is total.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = if now > self.last_created {
            now
        } else {
            self.last_created + Duration::microseconds(1)
        };
        self.last_created = next;
        next
    }

    fn ensure_unique(&self, id: UserId, username: &str, email: &str) -> RepositoryResult<()> {
        for other in self.users.values().filter(|u| u.id != id) {
            if other.username == username {
                return Err(unique_violation("users_username_key"));
            }
            if other.email == email {
                return Err(unique_violation("users_email_key"));
            }
        }
        Ok(())
    }

    fn ensure_user(&self, id: UserId, constraint: &str) -> RepositoryResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::Database(format!(
                "violates foreign key constraint \"{constraint}\""
            )))
        }
    }

    /// Public view of a user: the hash stays behind.
    fn public_user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|u| User {
            password_hash: String::new(),
            ..u.clone()
        })
    }

    fn with_author(&self, post: &Post) -> Post {
        let author_username = self
            .users
            .get(&post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        Post {
            author_username,
            ..post.clone()
        }
    }

    fn posts_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| keep(p))
            .map(|p| self.with_author(p))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

fn unique_violation(constraint: &str) -> RepositoryError {
    RepositoryError::Database(format!(
        "duplicate key value violates unique constraint \"{constraint}\""
    ))
}

fn sorted_users(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.username.cmp(&b.username)));
    users
}

/// One store backs all three repository traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| RepositoryError::Database("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| RepositoryError::Database("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<User> {
        let mut state = self.write()?;
        let id = UserId::new();
        state.ensure_unique(id, &user.username, &user.email)?;

        let stored = User {
            id,
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: state.next_created_at(),
        };
        state.users.insert(id, stored);
        Ok(state.public_user(id).unwrap_or_default())
    }

    async fn search(&self, name_or_username: &str) -> RepositoryResult<Vec<User>> {
        let state = self.read()?;
        let needle = name_or_username.to_lowercase();
        let found = state
            .users
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.username.to_lowercase().contains(&needle)
            })
            .filter_map(|u| state.public_user(u.id))
            .collect();
        Ok(sorted_users(found))
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.public_user(id))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_unique(id, &changes.username, &changes.email)?;
        if let Some(user) = state.users.get_mut(&id) {
            user.name = changes.name.clone();
            user.username = changes.username.clone();
            user.email = changes.email.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.remove(&id).is_some() {
            state.posts.retain(|_, p| p.author_id != id);
            state
                .followers
                .retain(|f| f.user_id() != id && f.follower_id() != id);
        }
        Ok(())
    }

    async fn password_hash(&self, id: UserId) -> RepositoryResult<Option<String>> {
        Ok(self.read()?.users.get(&id).map(|u| u.password_hash.clone()))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()> {
        if let Some(user) = self.write()?.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl FollowerRepository for InMemoryStore {
    async fn follow(&self, edge: Follow) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_user(edge.user_id(), "followers_user_id_fkey")?;
        state.ensure_user(edge.follower_id(), "followers_follower_id_fkey")?;
        state.followers.insert(edge);
        Ok(())
    }

    async fn unfollow(&self, edge: Follow) -> RepositoryResult<()> {
        self.write()?.followers.remove(&edge);
        Ok(())
    }

    async fn followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let state = self.read()?;
        let users = state
            .followers
            .iter()
            .filter(|f| f.user_id() == user_id)
            .filter_map(|f| state.public_user(f.follower_id()))
            .collect();
        Ok(sorted_users(users))
    }

    async fn following(&self, follower_id: UserId) -> RepositoryResult<Vec<User>> {
        let state = self.read()?;
        let users = state
            .followers
            .iter()
            .filter(|f| f.follower_id() == follower_id)
            .filter_map(|f| state.public_user(f.user_id()))
            .collect();
        Ok(sorted_users(users))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, author_id: UserId, draft: &PostDraft) -> RepositoryResult<PostId> {
        let mut state = self.write()?;
        state.ensure_user(author_id, "posts_author_id_fkey")?;

        let id = PostId::new();
        let created_at = state.next_created_at();
        state.posts.insert(
            id,
            Post {
                id,
                title: draft.title.clone(),
                content: draft.content.clone(),
                author_id,
                author_username: String::new(),
                likes: 0,
                created_at,
            },
        );
        Ok(id)
    }

    async fn feed(&self, user_id: UserId) -> RepositoryResult<Vec<Post>> {
        let state = self.read()?;
        let followed: HashSet<UserId> = state
            .followers
            .iter()
            .filter(|f| f.follower_id() == user_id)
            .map(|f| f.user_id())
            .collect();
        Ok(state.posts_where(|p| p.author_id == user_id || followed.contains(&p.author_id)))
    }

    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let state = self.read()?;
        Ok(state.posts.get(&id).map(|p| state.with_author(p)))
    }

    async fn update(&self, id: PostId, draft: &PostDraft) -> RepositoryResult<()> {
        if let Some(post) = self.write()?.posts.get_mut(&id) {
            post.title = draft.title.clone();
            post.content = draft.content.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: PostId) -> RepositoryResult<()> {
        self.write()?.posts.remove(&id);
        Ok(())
    }

    async fn by_author(&self, author_id: UserId) -> RepositoryResult<Vec<Post>> {
        Ok(self.read()?.posts_where(|p| p.author_id == author_id))
    }

    async fn like(&self, id: PostId) -> RepositoryResult<()> {
        if let Some(post) = self.write()?.posts.get_mut(&id) {
            post.likes += 1;
        }
        Ok(())
    }

    async fn unlike(&self, id: PostId) -> RepositoryResult<()> {
        if let Some(post) = self.write()?.posts.get_mut(&id) {
            post.likes = (post.likes - 1).max(0);
        }
        Ok(())
    }
}
