// src/services/serial_service.rs
//
// Serial content flows: episodes in and out with the duration roll-up,
// and serial removal with its dependents.

use std::sync::Arc;

use crate::domain::{EntityId, Episode, Season, Serial};
use crate::error::{AppError, AppResult};
use crate::repositories::{
    CommentRepository, EpisodeRepository, FavouriteRepository, SeasonRepository,
    SerialActorRepository, SerialFavouriteRepository, SerialRepository, SerialUserRepository,
};
use crate::services::AggregateService;

pub struct SerialService {
    serial_repo: Arc<dyn SerialRepository>,
    season_repo: Arc<dyn SeasonRepository>,
    episode_repo: Arc<dyn EpisodeRepository>,
    favourite_repo: Arc<dyn FavouriteRepository>,
    serial_actor_repo: Arc<dyn SerialActorRepository>,
    serial_favourite_repo: Arc<dyn SerialFavouriteRepository>,
    serial_user_repo: Arc<dyn SerialUserRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    aggregates: Arc<AggregateService>,
}

impl SerialService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        serial_repo: Arc<dyn SerialRepository>,
        season_repo: Arc<dyn SeasonRepository>,
        episode_repo: Arc<dyn EpisodeRepository>,
        favourite_repo: Arc<dyn FavouriteRepository>,
        serial_actor_repo: Arc<dyn SerialActorRepository>,
        serial_favourite_repo: Arc<dyn SerialFavouriteRepository>,
        serial_user_repo: Arc<dyn SerialUserRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        aggregates: Arc<AggregateService>,
    ) -> Self {
        Self {
            serial_repo,
            season_repo,
            episode_repo,
            favourite_repo,
            serial_actor_repo,
            serial_favourite_repo,
            serial_user_repo,
            comment_repo,
            aggregates,
        }
    }

    /// Keeps `cnt_episodes` equal to the season's stored episodes.
    fn refresh_season(&self, mut season: Season) -> AppResult<()> {
        let count = self.episode_repo.count_by_season(season.id)? as i32;
        if season.cnt_episodes != count {
            season.cnt_episodes = count;
            self.season_repo.update(&season)?;
        }
        Ok(())
    }

    /// Stores the episode and rolls the owning serial's duration up.
    /// Returns the new episode id and the refreshed serial.
    pub fn add_episode(&self, episode: &Episode) -> AppResult<(EntityId, Serial)> {
        let season = self.season_repo.get_by_id(episode.season_id)?;
        let mut serial = self.serial_repo.get_by_id(season.serial_id)?;

        let id = self.episode_repo.create(episode)?;
        self.refresh_season(season)?;
        self.aggregates.calculate_duration(&mut serial)?;

        log::info!("Added episode {} to serial {}", id, serial.id);
        Ok((id, serial))
    }

    /// Deletes the episode and rolls the serial up again. When the serial
    /// has no episodes left its duration is reset to 0 and `None` is
    /// returned.
    pub fn remove_episode(&self, episode_id: EntityId) -> AppResult<Option<Serial>> {
        let episode = self.episode_repo.get_by_id(episode_id)?;
        let season = self.season_repo.get_by_id(episode.season_id)?;
        let mut serial = self.serial_repo.get_by_id(season.serial_id)?;

        self.episode_repo.delete(episode_id)?;
        self.refresh_season(season)?;

        match self.aggregates.calculate_duration(&mut serial) {
            Ok(_) => Ok(Some(serial)),
            Err(AppError::NoData(_)) => {
                serial.duration = 0;
                self.serial_repo.update(&serial)?;
                log::info!("Serial {} has no episodes left", serial.id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the serial with its seasons, episodes, links and comments.
    /// Favourite counters of the affected users are lowered.
    pub fn remove_serial(&self, serial_id: EntityId) -> AppResult<()> {
        self.serial_actor_repo.delete_by_serial(serial_id)?;

        for link in self.serial_favourite_repo.list_by_serial(serial_id)? {
            let mut favourite = match self.favourite_repo.get_by_id(link.favourite_id) {
                Ok(favourite) => favourite,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            favourite.cnt_serials = (favourite.cnt_serials - 1).max(0);
            self.favourite_repo.update(&favourite)?;
        }
        self.serial_favourite_repo.delete_by_serial(serial_id)?;

        self.serial_user_repo.delete_by_serial(serial_id)?;
        self.comment_repo.delete_by_serial(serial_id)?;

        for season in self.season_repo.list_by_serial(serial_id)? {
            for episode in self.episode_repo.list_by_season(season.id)? {
                self.episode_repo.delete(episode.id)?;
            }
            self.season_repo.delete(season.id)?;
        }

        self.serial_repo.delete(serial_id)?;
        log::info!("Removed serial {}", serial_id);
        Ok(())
    }
}
