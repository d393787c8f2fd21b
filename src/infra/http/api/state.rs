use std::sync::Arc;

use crate::application::admin::AdminService;
use crate::application::blogs::BlogService;
use crate::application::messages::MessageService;
use crate::application::notify::Notifier;
use crate::application::projects::ProjectService;
use crate::application::repos::Repositories;
use crate::application::search::SearchService;
use crate::application::services::ServiceCatalog;
use crate::application::skills::SkillService;
use crate::application::subscribers::SubscriberService;
use crate::application::users::UserService;
use crate::cache::{CachePolicy, CacheState, ResponseCache};
use crate::config::AuthSettings;
use crate::infra::uploads::UploadStorage;

#[derive(Clone)]
pub struct ApiState {
    pub projects: ProjectService,
    pub blogs: BlogService,
    pub skills: SkillService,
    pub services: ServiceCatalog,
    pub subscribers: SubscriberService,
    pub messages: MessageService,
    pub users: UserService,
    pub search: SearchService,
    pub admin: AdminService,
    pub cache: ResponseCache,
    pub cache_policy: Arc<CachePolicy>,
    pub upload_storage: Arc<UploadStorage>,
}

impl ApiState {
    /// Wires every service onto one storage adapter.
    pub fn new<R: Repositories>(
        repos: Arc<R>,
        auth: &AuthSettings,
        notifier: Arc<dyn Notifier>,
        cache: CacheState,
        upload_storage: Arc<UploadStorage>,
    ) -> Self {
        Self {
            projects: ProjectService::new(repos.clone()),
            blogs: BlogService::new(repos.clone()),
            skills: SkillService::new(repos.clone()),
            services: ServiceCatalog::new(repos.clone()),
            subscribers: SubscriberService::new(repos.clone(), notifier.clone()),
            messages: MessageService::new(repos.clone(), notifier),
            users: UserService::new(
                repos.clone(),
                repos.clone(),
                auth.admin_email.clone(),
                auth.token_ttl,
            ),
            search: SearchService::new(repos.clone(), repos.clone()),
            admin: AdminService::new(repos.clone(), repos),
            cache: cache.cache,
            cache_policy: cache.policy,
            upload_storage,
        }
    }

    pub fn cache_state(&self) -> CacheState {
        CacheState {
            cache: self.cache.clone(),
            policy: self.cache_policy.clone(),
        }
    }
}
