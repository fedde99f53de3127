use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, NewNotification, NewTeam, NewTournament, Notifications, PrimaryKey,
    TournamentData, UpdatedTournament,
};

/// Manages tournaments and their team enrollments.
///
/// Anyone can browse tournaments and enroll a team; creating, editing and
/// deleting a tournament is reserved for its creator.
pub struct Tournaments<Db> {
    db: Arc<Db>,
    notifications: Notifications<Db>,
}

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Todos los campos son obligatorios")]
    MissingFields,
    #[error("La fecha de finalización debe ser posterior a la fecha de inicio")]
    InvalidDates,
    #[error("El número de equipos debe ser mayor a cero")]
    InvalidCapacity,
    /// The tournament has no spots left
    #[error("El torneo ya tiene todos los cupos ocupados")]
    Full,
    /// The requester is not the tournament's creator
    #[error("No tienes permiso para modificar este torneo")]
    NotCreator,
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> Tournaments<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>, notifications: &Notifications<Db>) -> Self {
        Self {
            db: db.clone(),
            notifications: notifications.clone(),
        }
    }

    /// Creates a tournament with an empty enrollment list
    pub async fn create(
        &self,
        new_tournament: NewTournament,
    ) -> Result<TournamentData, TournamentError> {
        if new_tournament.nombre.trim().is_empty() || new_tournament.ubicacion.trim().is_empty() {
            return Err(TournamentError::MissingFields);
        }

        if new_tournament.fecha_fin <= new_tournament.fecha_inicio {
            return Err(TournamentError::InvalidDates);
        }

        if new_tournament.num_equipos <= 0 {
            return Err(TournamentError::InvalidCapacity);
        }

        let tournament = self
            .db
            .create_tournament(new_tournament)
            .await
            .map_err(TournamentError::Db)?;

        self.notifications
            .emit(NewNotification::tournament_created(
                tournament.creador_id,
                &tournament.nombre,
            ))
            .await;

        Ok(tournament)
    }

    /// Returns all tournaments, newest first. Open to everyone.
    pub async fn list(&self) -> Result<Vec<TournamentData>, DatabaseError> {
        self.db.list_tournaments().await
    }

    pub async fn get(&self, tournament_id: PrimaryKey) -> Result<TournamentData, DatabaseError> {
        self.db.tournament_by_id(tournament_id).await
    }

    /// Enrolls a team into a tournament. Deliberately not gated by
    /// authentication: anyone holding the tournament id may sign a team up.
    pub async fn enroll_team(
        &self,
        tournament_id: PrimaryKey,
        new_team: NewTeam,
    ) -> Result<TournamentData, TournamentError> {
        if new_team.nombre.trim().is_empty()
            || new_team.capitan.trim().is_empty()
            || new_team.email.trim().is_empty()
        {
            return Err(TournamentError::MissingFields);
        }

        let tournament = self
            .db
            .tournament_by_id(tournament_id)
            .await
            .map_err(TournamentError::Db)?;

        if tournament.teams.len() as i32 >= tournament.num_equipos {
            return Err(TournamentError::Full);
        }

        self.db
            .create_team(tournament_id, new_team)
            .await
            .map_err(TournamentError::Db)
    }

    /// Updates a tournament. Creator only; date ordering is re-validated
    /// against the effective dates when either one changes.
    pub async fn update(
        &self,
        requester_id: PrimaryKey,
        updated: UpdatedTournament,
    ) -> Result<TournamentData, TournamentError> {
        let tournament = self
            .db
            .tournament_by_id(updated.id)
            .await
            .map_err(TournamentError::Db)?;

        if tournament.creador_id != requester_id {
            return Err(TournamentError::NotCreator);
        }

        let fecha_inicio = updated.fecha_inicio.unwrap_or(tournament.fecha_inicio);
        let fecha_fin = updated.fecha_fin.unwrap_or(tournament.fecha_fin);

        if fecha_fin <= fecha_inicio {
            return Err(TournamentError::InvalidDates);
        }

        if let Some(num_equipos) = updated.num_equipos {
            if num_equipos <= 0 {
                return Err(TournamentError::InvalidCapacity);
            }
        }

        self.db
            .update_tournament(updated)
            .await
            .map_err(TournamentError::Db)
    }

    /// Deletes a tournament along with its enrollments. Creator only.
    pub async fn delete(
        &self,
        requester_id: PrimaryKey,
        tournament_id: PrimaryKey,
    ) -> Result<(), TournamentError> {
        let tournament = self
            .db
            .tournament_by_id(tournament_id)
            .await
            .map_err(TournamentError::Db)?;

        if tournament.creador_id != requester_id {
            return Err(TournamentError::NotCreator);
        }

        self.db
            .delete_tournament(tournament_id)
            .await
            .map_err(TournamentError::Db)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;
    use chrono::NaiveDate;

    fn tournaments() -> Tournaments<MemoryDatabase> {
        let db = Arc::new(MemoryDatabase::new());
        let notifications = Notifications::new(&db);

        Tournaments::new(&db, &notifications)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn copa(creador_id: PrimaryKey, num_equipos: i32) -> NewTournament {
        NewTournament {
            nombre: "Copa Primavera".to_string(),
            fecha_inicio: date("2030-03-01"),
            fecha_fin: date("2030-03-15"),
            num_equipos,
            costo: 50000.0,
            ubicacion: "Cancha Norte".to_string(),
            descripcion: "Fútbol 5, todos contra todos".to_string(),
            creador_id,
            creador_nombre: "Ana".to_string(),
        }
    }

    fn team(nombre: &str) -> NewTeam {
        NewTeam {
            nombre: nombre.to_string(),
            capitan: "Luis".to_string(),
            telefono: "300123".to_string(),
            email: "luis@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn end_date_must_be_after_start_date() {
        let tournaments = tournaments();

        let mut backwards = copa(1, 8);
        backwards.fecha_fin = backwards.fecha_inicio;

        assert!(matches!(
            tournaments.create(backwards).await,
            Err(TournamentError::InvalidDates)
        ));
    }

    #[tokio::test]
    async fn enrollment_stops_at_capacity() {
        let tournaments = tournaments();
        let tournament = tournaments.create(copa(1, 2)).await.unwrap();

        tournaments.enroll_team(tournament.id, team("Los Rayos")).await.unwrap();
        let updated = tournaments
            .enroll_team(tournament.id, team("Las Águilas"))
            .await
            .unwrap();
        assert_eq!(updated.teams.len(), 2);
        assert_eq!(updated.available_spots(), 0);

        let full = tournaments.enroll_team(tournament.id, team("Los Pumas")).await;
        assert!(matches!(full, Err(TournamentError::Full)));
    }

    #[tokio::test]
    async fn team_names_are_unique_within_a_tournament() {
        let tournaments = tournaments();
        let tournament = tournaments.create(copa(1, 8)).await.unwrap();

        tournaments.enroll_team(tournament.id, team("Los Rayos")).await.unwrap();

        let duplicate = tournaments.enroll_team(tournament.id, team("LOS RAYOS")).await;
        assert!(matches!(
            duplicate,
            Err(TournamentError::Db(DatabaseError::Conflict { .. }))
        ));

        // The same name in a different tournament is fine
        let other = tournaments.create(copa(1, 8)).await.unwrap();
        tournaments.enroll_team(other.id, team("Los Rayos")).await.unwrap();
    }

    #[tokio::test]
    async fn enrolling_into_an_absent_tournament_fails() {
        let tournaments = tournaments();

        let absent = tournaments.enroll_team(999, team("Los Rayos")).await;
        assert!(matches!(
            absent,
            Err(TournamentError::Db(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn only_the_creator_can_update_or_delete() {
        let tournaments = tournaments();
        let tournament = tournaments.create(copa(1, 8)).await.unwrap();

        let update = UpdatedTournament {
            id: tournament.id,
            nombre: Some("Copa Otoño".to_string()),
            fecha_inicio: None,
            fecha_fin: None,
            num_equipos: None,
            costo: None,
            ubicacion: None,
            descripcion: None,
        };

        assert!(matches!(
            tournaments.update(2, update).await,
            Err(TournamentError::NotCreator)
        ));
        assert!(matches!(
            tournaments.delete(2, tournament.id).await,
            Err(TournamentError::NotCreator)
        ));

        tournaments.delete(1, tournament.id).await.unwrap();
        assert!(tournaments.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_revalidates_date_ordering() {
        let tournaments = tournaments();
        let tournament = tournaments.create(copa(1, 8)).await.unwrap();

        let backwards = UpdatedTournament {
            id: tournament.id,
            nombre: None,
            fecha_inicio: None,
            // Before the existing start date
            fecha_fin: Some(date("2030-02-01")),
            num_equipos: None,
            costo: None,
            ubicacion: None,
            descripcion: None,
        };

        assert!(matches!(
            tournaments.update(1, backwards).await,
            Err(TournamentError::InvalidDates)
        ));

        let renamed = UpdatedTournament {
            id: tournament.id,
            nombre: Some("Copa Otoño".to_string()),
            fecha_inicio: None,
            fecha_fin: None,
            num_equipos: None,
            costo: None,
            ubicacion: None,
            descripcion: None,
        };

        let updated = tournaments.update(1, renamed).await.unwrap();
        assert_eq!(updated.nombre, "Copa Otoño");
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let tournaments = tournaments();

        let first = tournaments.create(copa(1, 8)).await.unwrap();
        let second = tournaments.create(copa(1, 8)).await.unwrap();

        let list = tournaments.list().await.unwrap();
        assert_eq!(
            list.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }
}
