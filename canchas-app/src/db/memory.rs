use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{
    Database, DatabaseError, NewNotification, NewReservation, NewTeam, NewTournament, NewUser,
    NotificationData, NotificationPage, PrimaryKey, ReservationData, Result, TeamData,
    TournamentData, UpdatedTournament, UserData,
};

/// An in-memory database implementation for canchas.
///
/// Behaves like [PgDatabase](crate::PgDatabase) as far as the [Database]
/// contract is concerned, which makes it useful for tests and for running
/// without a postgres instance.
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: PrimaryKey,
    users: Vec<UserData>,
    reservations: Vec<ReservationData>,
    tournaments: Vec<TournamentData>,
    notifications: Vec<NotificationData>,
}

impl State {
    fn assign_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(resource: &'static str, identifier: &'static str) -> DatabaseError {
    DatabaseError::NotFound {
        resource,
        identifier,
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("usuario", "id"))
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| not_found("usuario", "email"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.lock();

        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict {
                resource: "usuario",
                field: "email",
                value: new_user.email,
            });
        }

        let user = UserData {
            id: state.assign_id(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            created_at: Utc::now(),
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn create_reservation(&self, new_reservation: NewReservation) -> Result<ReservationData> {
        let mut state = self.state.lock();

        let taken = state.reservations.iter().any(|r| {
            r.cancha == new_reservation.cancha
                && r.fecha == new_reservation.fecha
                && r.hora == new_reservation.hora
        });

        if taken {
            return Err(DatabaseError::Conflict {
                resource: "reserva",
                field: "horario",
                value: format!(
                    "{} {} {}",
                    new_reservation.cancha, new_reservation.fecha, new_reservation.hora
                ),
            });
        }

        let reservation = ReservationData {
            id: state.assign_id(),
            user_id: new_reservation.user_id,
            nombre: new_reservation.nombre,
            email: new_reservation.email,
            telefono: new_reservation.telefono,
            cancha: new_reservation.cancha,
            fecha: new_reservation.fecha,
            hora: new_reservation.hora,
            created_at: Utc::now(),
        };

        state.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn reservations_by_user(&self, user_id: PrimaryKey) -> Result<Vec<ReservationData>> {
        let mut reservations: Vec<_> = self
            .state
            .lock()
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();

        reservations.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(reservations)
    }

    async fn delete_reservation(
        &self,
        user_id: PrimaryKey,
        reservation_id: PrimaryKey,
    ) -> Result<ReservationData> {
        let mut state = self.state.lock();

        let index = state
            .reservations
            .iter()
            .position(|r| r.id == reservation_id && r.user_id == user_id)
            .ok_or_else(|| not_found("reserva", "id"))?;

        Ok(state.reservations.remove(index))
    }

    async fn create_tournament(&self, new_tournament: NewTournament) -> Result<TournamentData> {
        let mut state = self.state.lock();

        let tournament = TournamentData {
            id: state.assign_id(),
            nombre: new_tournament.nombre,
            fecha_inicio: new_tournament.fecha_inicio,
            fecha_fin: new_tournament.fecha_fin,
            num_equipos: new_tournament.num_equipos,
            costo: new_tournament.costo,
            ubicacion: new_tournament.ubicacion,
            descripcion: new_tournament.descripcion,
            creador_id: new_tournament.creador_id,
            creador_nombre: new_tournament.creador_nombre,
            created_at: Utc::now(),
            teams: vec![],
        };

        state.tournaments.push(tournament.clone());
        Ok(tournament)
    }

    async fn list_tournaments(&self) -> Result<Vec<TournamentData>> {
        let mut tournaments = self.state.lock().tournaments.clone();
        tournaments.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tournaments)
    }

    async fn tournament_by_id(&self, tournament_id: PrimaryKey) -> Result<TournamentData> {
        self.state
            .lock()
            .tournaments
            .iter()
            .find(|t| t.id == tournament_id)
            .cloned()
            .ok_or_else(|| not_found("torneo", "id"))
    }

    async fn create_team(
        &self,
        tournament_id: PrimaryKey,
        new_team: NewTeam,
    ) -> Result<TournamentData> {
        let mut state = self.state.lock();
        let id = state.assign_id();

        let tournament = state
            .tournaments
            .iter_mut()
            .find(|t| t.id == tournament_id)
            .ok_or_else(|| not_found("torneo", "id"))?;

        let duplicate = tournament
            .teams
            .iter()
            .any(|t| t.nombre.to_lowercase() == new_team.nombre.to_lowercase());

        if duplicate {
            return Err(DatabaseError::Conflict {
                resource: "equipo",
                field: "nombre",
                value: new_team.nombre,
            });
        }

        tournament.teams.push(TeamData {
            id,
            tournament_id,
            nombre: new_team.nombre,
            capitan: new_team.capitan,
            telefono: new_team.telefono,
            email: new_team.email,
            fecha_inscripcion: Utc::now(),
        });

        Ok(tournament.clone())
    }

    async fn update_tournament(&self, updated: UpdatedTournament) -> Result<TournamentData> {
        let mut state = self.state.lock();

        let tournament = state
            .tournaments
            .iter_mut()
            .find(|t| t.id == updated.id)
            .ok_or_else(|| not_found("torneo", "id"))?;

        if let Some(nombre) = updated.nombre {
            tournament.nombre = nombre;
        }
        if let Some(fecha_inicio) = updated.fecha_inicio {
            tournament.fecha_inicio = fecha_inicio;
        }
        if let Some(fecha_fin) = updated.fecha_fin {
            tournament.fecha_fin = fecha_fin;
        }
        if let Some(num_equipos) = updated.num_equipos {
            tournament.num_equipos = num_equipos;
        }
        if let Some(costo) = updated.costo {
            tournament.costo = costo;
        }
        if let Some(ubicacion) = updated.ubicacion {
            tournament.ubicacion = ubicacion;
        }
        if let Some(descripcion) = updated.descripcion {
            tournament.descripcion = descripcion;
        }

        Ok(tournament.clone())
    }

    async fn delete_tournament(&self, tournament_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        let index = state
            .tournaments
            .iter()
            .position(|t| t.id == tournament_id)
            .ok_or_else(|| not_found("torneo", "id"))?;

        state.tournaments.remove(index);
        Ok(())
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        let mut state = self.state.lock();

        let notification = NotificationData {
            id: state.assign_id(),
            user_id: new_notification.user_id,
            tipo: new_notification.tipo,
            titulo: new_notification.titulo,
            mensaje: new_notification.mensaje,
            leida: false,
            reserva_id: new_notification.reserva_id,
            icono: new_notification.icono,
            prioridad: new_notification.prioridad,
            created_at: Utc::now(),
        };

        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_by_user(
        &self,
        user_id: PrimaryKey,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<NotificationPage> {
        let state = self.state.lock();

        let mut owned: Vec<_> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| b.id.cmp(&a.id));

        let total = owned.len() as i64;
        let unread = owned.iter().filter(|n| !n.leida).count() as i64;

        let notifications = owned
            .into_iter()
            .filter(|n| !unread_only || !n.leida)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok(NotificationPage {
            notifications,
            total,
            unread,
        })
    }

    async fn unread_notification_count(&self, user_id: PrimaryKey) -> Result<i64> {
        let count = self
            .state
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.leida)
            .count();

        Ok(count as i64)
    }

    async fn mark_notification_read(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .ok_or_else(|| not_found("notificación", "id"))?;

        notification.leida = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id)
        {
            notification.leida = true;
        }

        Ok(())
    }

    async fn delete_notification(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let index = state
            .notifications
            .iter()
            .position(|n| n.id == notification_id && n.user_id == user_id)
            .ok_or_else(|| not_found("notificación", "id"))?;

        state.notifications.remove(index);
        Ok(())
    }

    async fn delete_read_notifications(&self, user_id: PrimaryKey) -> Result<u64> {
        let mut state = self.state.lock();

        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| n.user_id != user_id || !n.leida);

        Ok((before - state.notifications.len()) as u64)
    }
}
