use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, query, query_as, query_scalar, Error as SqlxError, FromRow, PgPool};

use crate::{
    Database, DatabaseError, IntoDatabaseError, NewNotification, NewReservation, NewTeam,
    NewTournament, NewUser, NotificationData, NotificationPage, PrimaryKey, ReservationData,
    Result, TeamData, TournamentData, UpdatedTournament, UserData,
};

/// A postgres database implementation for canchas
pub struct PgDatabase {
    pool: PgPool,
}

/// A tournament as stored, without its teams
#[derive(FromRow)]
struct TournamentRow {
    id: PrimaryKey,
    nombre: String,
    fecha_inicio: NaiveDate,
    fecha_fin: NaiveDate,
    num_equipos: i32,
    costo: f64,
    ubicacion: String,
    descripcion: String,
    creador_id: PrimaryKey,
    creador_nombre: String,
    created_at: DateTime<Utc>,
}

impl TournamentRow {
    fn with_teams(self, teams: Vec<TeamData>) -> TournamentData {
        TournamentData {
            id: self.id,
            nombre: self.nombre,
            fecha_inicio: self.fecha_inicio,
            fecha_fin: self.fecha_fin,
            num_equipos: self.num_equipos,
            costo: self.costo,
            ubicacion: self.ubicacion,
            descripcion: self.descripcion,
            creador_id: self.creador_id,
            creador_nombre: self.creador_nombre,
            created_at: self.created_at,
            teams,
        }
    }
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    /// Applies the embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))
    }

    async fn tournament_teams(&self, tournament_id: PrimaryKey) -> Result<Vec<TeamData>> {
        query_as::<_, TeamData>(
            "SELECT * FROM teams WHERE tournament_id = $1 ORDER BY fecha_inscripcion, id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        query_as::<_, UserData>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("usuario", "id"))
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        query_as::<_, UserData>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("usuario", "email"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        query_as::<_, UserData>(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_on("users_email_key", "usuario", "email", &new_user.email))
    }

    async fn create_reservation(&self, new_reservation: NewReservation) -> Result<ReservationData> {
        let slot = format!(
            "{} {} {}",
            new_reservation.cancha, new_reservation.fecha, new_reservation.hora
        );

        query_as::<_, ReservationData>(
            "INSERT INTO reservations (user_id, nombre, email, telefono, cancha, fecha, hora)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new_reservation.user_id)
        .bind(&new_reservation.nombre)
        .bind(&new_reservation.email)
        .bind(&new_reservation.telefono)
        .bind(&new_reservation.cancha)
        .bind(&new_reservation.fecha)
        .bind(&new_reservation.hora)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_on("reservations_slot_key", "reserva", "horario", &slot))
    }

    async fn reservations_by_user(&self, user_id: PrimaryKey) -> Result<Vec<ReservationData>> {
        query_as::<_, ReservationData>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_reservation(
        &self,
        user_id: PrimaryKey,
        reservation_id: PrimaryKey,
    ) -> Result<ReservationData> {
        query_as::<_, ReservationData>(
            "DELETE FROM reservations WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(reservation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("reserva", "id"))
    }

    async fn create_tournament(&self, new_tournament: NewTournament) -> Result<TournamentData> {
        let row = query_as::<_, TournamentRow>(
            "INSERT INTO tournaments
                (nombre, fecha_inicio, fecha_fin, num_equipos, costo, ubicacion, descripcion, creador_id, creador_nombre)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(&new_tournament.nombre)
        .bind(new_tournament.fecha_inicio)
        .bind(new_tournament.fecha_fin)
        .bind(new_tournament.num_equipos)
        .bind(new_tournament.costo)
        .bind(&new_tournament.ubicacion)
        .bind(&new_tournament.descripcion)
        .bind(new_tournament.creador_id)
        .bind(&new_tournament.creador_nombre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(row.with_teams(vec![]))
    }

    async fn list_tournaments(&self) -> Result<Vec<TournamentData>> {
        let rows = query_as::<_, TournamentRow>(
            "SELECT * FROM tournaments ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let mut tournaments = Vec::with_capacity(rows.len());

        for row in rows {
            let teams = self.tournament_teams(row.id).await?;
            tournaments.push(row.with_teams(teams));
        }

        Ok(tournaments)
    }

    async fn tournament_by_id(&self, tournament_id: PrimaryKey) -> Result<TournamentData> {
        let row = query_as::<_, TournamentRow>("SELECT * FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("torneo", "id"))?;

        let teams = self.tournament_teams(tournament_id).await?;

        Ok(row.with_teams(teams))
    }

    async fn create_team(
        &self,
        tournament_id: PrimaryKey,
        new_team: NewTeam,
    ) -> Result<TournamentData> {
        query(
            "INSERT INTO teams (tournament_id, nombre, capitan, telefono, email)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(tournament_id)
        .bind(&new_team.nombre)
        .bind(&new_team.capitan)
        .bind(&new_team.telefono)
        .bind(&new_team.email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            e.conflict_on(
                "teams_tournament_nombre_key",
                "equipo",
                "nombre",
                &new_team.nombre,
            )
        })?;

        self.tournament_by_id(tournament_id).await
    }

    async fn update_tournament(&self, updated: UpdatedTournament) -> Result<TournamentData> {
        let tournament = self.tournament_by_id(updated.id).await?;

        query(
            "UPDATE tournaments SET
                nombre = $1,
                fecha_inicio = $2,
                fecha_fin = $3,
                num_equipos = $4,
                costo = $5,
                ubicacion = $6,
                descripcion = $7
            WHERE id = $8",
        )
        .bind(updated.nombre.unwrap_or(tournament.nombre))
        .bind(updated.fecha_inicio.unwrap_or(tournament.fecha_inicio))
        .bind(updated.fecha_fin.unwrap_or(tournament.fecha_fin))
        .bind(updated.num_equipos.unwrap_or(tournament.num_equipos))
        .bind(updated.costo.unwrap_or(tournament.costo))
        .bind(updated.ubicacion.unwrap_or(tournament.ubicacion))
        .bind(updated.descripcion.unwrap_or(tournament.descripcion))
        .bind(updated.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.tournament_by_id(updated.id).await
    }

    async fn delete_tournament(&self, tournament_id: PrimaryKey) -> Result<()> {
        // Ensure the tournament exists
        let _ = self.tournament_by_id(tournament_id).await?;

        query("DELETE FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        query_as::<_, NotificationData>(
            "INSERT INTO notifications (user_id, tipo, titulo, mensaje, reserva_id, icono, prioridad)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new_notification.user_id)
        .bind(&new_notification.tipo)
        .bind(&new_notification.titulo)
        .bind(&new_notification.mensaje)
        .bind(new_notification.reserva_id)
        .bind(&new_notification.icono)
        .bind(&new_notification.prioridad)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn notifications_by_user(
        &self,
        user_id: PrimaryKey,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<NotificationPage> {
        let sql = if unread_only {
            "SELECT * FROM notifications WHERE user_id = $1 AND NOT leida
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        } else {
            "SELECT * FROM notifications WHERE user_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        };

        let notifications = query_as::<_, NotificationData>(sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let total: i64 = query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let unread = self.unread_notification_count(user_id).await?;

        Ok(NotificationPage {
            notifications,
            total,
            unread,
        })
    }

    async fn unread_notification_count(&self, user_id: PrimaryKey) -> Result<i64> {
        query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT leida")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn mark_notification_read(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()> {
        let result = query("UPDATE notifications SET leida = true WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "notificación",
                identifier: "id",
            });
        }

        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: PrimaryKey) -> Result<()> {
        query("UPDATE notifications SET leida = true WHERE user_id = $1 AND NOT leida")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn delete_notification(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()> {
        let result = query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "notificación",
                identifier: "id",
            });
        }

        Ok(())
    }

    async fn delete_read_notifications(&self, user_id: PrimaryKey) -> Result<u64> {
        query("DELETE FROM notifications WHERE user_id = $1 AND leida")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|r| r.rows_affected())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => e.any(),
        }
    }

    fn conflict_on(
        self,
        constraint: &'static str,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        match &self {
            SqlxError::Database(e) if e.constraint() == Some(constraint) => {
                DatabaseError::Conflict {
                    resource,
                    field,
                    value: value.to_string(),
                }
            }
            _ => self.any(),
        }
    }
}
