use crate::{
    application::{
        generate_hair_style::use_case::GenerateHairStyleUseCase,
        square::use_case::SquareUseCase,
        user_account::use_case::{Rewards, UserAccountUseCase},
    },
    config::Config,
    domain::{
        record::repository::RecordRepository, square::repository::SquareRepository,
        user::repository::UserRepository,
    },
    infrastructure::{
        storage::mirror::ImageMirror, vision::traits::HairStyleGenerator,
        wechat::client::WechatAuthenticator,
    },
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: Option<redis::Client>,
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub record_repo: Arc<dyn RecordRepository>,
    pub square_repo: Arc<dyn SquareRepository>,
    pub generator: Arc<dyn HairStyleGenerator>,
    pub mirror: Arc<dyn ImageMirror>,
    pub wechat: Arc<dyn WechatAuthenticator>,
}

impl AppState {
    pub fn generation(&self) -> GenerateHairStyleUseCase {
        GenerateHairStyleUseCase::new(
            self.user_repo.clone(),
            self.record_repo.clone(),
            self.generator.clone(),
            self.mirror.clone(),
            self.config.generation_cost,
        )
    }

    pub fn accounts(&self) -> UserAccountUseCase {
        UserAccountUseCase::new(
            self.user_repo.clone(),
            self.wechat.clone(),
            Rewards {
                initial_coin: self.config.initial_coin,
                sign_in: self.config.sign_in_reward,
                invite: self.config.invite_reward,
            },
            self.config.sign_in_utc_offset_hours,
            self.config.default_avatar_url.clone(),
        )
    }

    pub fn square(&self) -> SquareUseCase {
        SquareUseCase::new(self.square_repo.clone(), self.config.default_avatar_url.clone())
    }
}
