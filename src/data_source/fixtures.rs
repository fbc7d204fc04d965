use crate::auth::context::SessionUser;
use crate::auth::types::{AuthResponse, CreateUserRequest, LoginRequest};
use crate::auth::SessionContext;
use crate::config::DataSourceKind;
use crate::data_source::DataSource;
use crate::domains::campaign::{CampaignRecord, DonationRecord, NewDonation};
use crate::domains::project::{Enrollment, EnrollmentStatus, ProjectQuery, ProjectRecord};
use crate::domains::user::{UpdateProfile, UserProfile, UserType};
use crate::errors::{DomainError, ServiceError, ServiceResult, ValidationError};
use crate::types::{Location, OrganizationRef, RecordStatus};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Credentials of the sample volunteer account
pub const DEMO_EMAIL: &str = "maria.silva@email.com";
pub const DEMO_PASSWORD: &str = "voluntaria123";

struct FixtureUser {
    profile: UserProfile,
    password: String,
}

impl FixtureUser {
    fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.profile.id.clone(),
            name: self.profile.name.clone(),
            email: self.profile.email.clone(),
            user_type: self.profile.user_type,
        }
    }
}

struct FixtureStore {
    campaigns: Vec<CampaignRecord>,
    projects: Vec<ProjectRecord>,
    users: Vec<FixtureUser>,
    /// Issued token -> user id
    tokens: HashMap<String, String>,
}

impl FixtureStore {
    fn user_index(&self, session: &SessionContext) -> ServiceResult<usize> {
        let session = session.require()?;
        let user_id = self
            .tokens
            .get(&session.token)
            .ok_or_else(|| ServiceError::Authentication("Session is not recognised".to_string()))?;
        self.users
            .iter()
            .position(|u| &u.profile.id == user_id)
            .ok_or_else(|| ServiceError::Authentication("Session is not recognised".to_string()))
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = format!("fixture-{}", Uuid::new_v4());
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

/// In-memory data source seeded with the sample campaigns, projects and a
/// demo account. Submissions are applied to the store, so a re-fetch after
/// a write shows the new totals.
pub struct FixtureDataSource {
    store: RwLock<FixtureStore>,
}

impl Default for FixtureDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDataSource {
    pub fn new() -> Self {
        Self::with_records(campaigns(), projects())
    }

    pub fn with_records(campaigns: Vec<CampaignRecord>, projects: Vec<ProjectRecord>) -> Self {
        Self {
            store: RwLock::new(FixtureStore {
                campaigns,
                projects,
                users: vec![demo_user()],
                tokens: HashMap::new(),
            }),
        }
    }
}

#[async_trait]
impl DataSource for FixtureDataSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Fixture
    }

    async fn fetch_projects(
        &self,
        query: Option<&ProjectQuery>,
        _session: &SessionContext,
    ) -> ServiceResult<Vec<ProjectRecord>> {
        let store = self.store.read().await;
        Ok(store
            .projects
            .iter()
            .filter(|p| query.map_or(true, |q| q.matches(p)))
            .cloned()
            .collect())
    }

    async fn fetch_project_by_id(&self, id: &str, _session: &SessionContext) -> ServiceResult<ProjectRecord> {
        let store = self.store.read().await;
        store
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Project", id).into())
    }

    async fn fetch_campaigns(&self, _session: &SessionContext) -> ServiceResult<Vec<CampaignRecord>> {
        Ok(self.store.read().await.campaigns.clone())
    }

    async fn fetch_campaign_by_id(&self, id: &str, _session: &SessionContext) -> ServiceResult<CampaignRecord> {
        let store = self.store.read().await;
        store
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Campaign", id).into())
    }

    async fn submit_donation(
        &self,
        campaign_id: &str,
        donation: &NewDonation,
        _session: &SessionContext,
    ) -> ServiceResult<()> {
        let mut store = self.store.write().await;
        let campaign = store
            .campaigns
            .iter_mut()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| DomainError::not_found("Campaign", campaign_id))?;

        if !campaign.accepts_donations() {
            return Err(ValidationError::invalid_value("campaign", "is not accepting donations").into());
        }

        campaign.current_amount = Some(campaign.current_amount.unwrap_or(Decimal::ZERO) + donation.amount);
        campaign.donor_count += 1;
        campaign.recent_donations.insert(
            0,
            DonationRecord {
                donor_name: donation.donor_name.clone(),
                amount: donation.amount,
                date: Some(Utc::now()),
                message: donation.message.clone(),
                anonymous: donation.anonymous,
            },
        );
        info!("Fixture donation of {} recorded for campaign {}", donation.amount, campaign_id);
        Ok(())
    }

    async fn submit_enrollment(&self, project_id: &str, session: &SessionContext) -> ServiceResult<()> {
        let mut store = self.store.write().await;
        let user_index = store.user_index(session)?;
        let volunteer = store.users[user_index].session_user();

        let project = store
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| DomainError::not_found("Project", project_id))?;

        if !project.accepts_enrollment() {
            return Err(ValidationError::invalid_value("project", "is not accepting volunteers").into());
        }
        if project.is_enrolled(&volunteer.id) {
            return Err(ValidationError::invalid_value("project", "you are already enrolled").into());
        }

        project.enrollments.push(Enrollment {
            volunteer_id: volunteer.id.clone(),
            volunteer_name: Some(volunteer.name),
            status: EnrollmentStatus::Pending,
            enrolled_at: Some(Utc::now()),
        });
        info!("Fixture enrollment of {} in project {}", volunteer.id, project_id);
        Ok(())
    }

    async fn login(&self, credentials: &LoginRequest) -> ServiceResult<AuthResponse> {
        let mut store = self.store.write().await;
        let email = credentials.email.trim();
        let user = store
            .users
            .iter()
            .find(|u| u.profile.email.eq_ignore_ascii_case(email) && u.password == credentials.password)
            .map(FixtureUser::session_user)
            .ok_or_else(|| ServiceError::Authentication("Invalid email or password".to_string()))?;

        let access_token = store.issue_token(&user.id);
        debug!("Fixture login for {}", user.email);
        Ok(AuthResponse { access_token, user })
    }

    async fn register(&self, request: &CreateUserRequest) -> ServiceResult<AuthResponse> {
        let mut store = self.store.write().await;
        let email = request.email.trim();
        if store.users.iter().any(|u| u.profile.email.eq_ignore_ascii_case(email)) {
            return Err(ValidationError::invalid_value("email", "is already registered").into());
        }

        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: email.to_string(),
            city: Some(request.city.trim().to_string()),
            state: Some(request.state.trim().to_uppercase()),
            phone: None,
            bio: None,
            experience: request.experience.clone(),
            skills: request.skills.clone(),
            preferred_causes: request.preferred_causes.clone(),
            user_type: request.user_type,
            created_at: Some(Utc::now()),
        };
        let user = FixtureUser {
            profile,
            password: request.password.clone(),
        };
        let session_user = user.session_user();
        store.users.push(user);

        let access_token = store.issue_token(&session_user.id);
        Ok(AuthResponse {
            access_token,
            user: session_user,
        })
    }

    async fn fetch_profile(&self, session: &SessionContext) -> ServiceResult<UserProfile> {
        let store = self.store.read().await;
        let index = store.user_index(session)?;
        Ok(store.users[index].profile.clone())
    }

    async fn update_profile(&self, update: &UpdateProfile, session: &SessionContext) -> ServiceResult<UserProfile> {
        let mut store = self.store.write().await;
        let index = store.user_index(session)?;
        let profile = &mut store.users[index].profile;
        profile.apply(update);
        Ok(profile.clone())
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

fn organization(name: &str, city: &str, state: &str, contact: Option<&str>) -> Option<OrganizationRef> {
    Some(OrganizationRef {
        id: None,
        name: Some(name.to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        contact: contact.map(str::to_string),
    })
}

#[allow(clippy::too_many_arguments)]
fn campaign(
    id: u32,
    title: &str,
    description: &str,
    category: &str,
    goal: u32,
    raised: u32,
    donors: u32,
    org: &str,
    (city, state): (&str, &str),
    status: &str,
    urgent: bool,
    end_date: Option<DateTime<Utc>>,
) -> CampaignRecord {
    CampaignRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        full_description: None,
        category: Some(category.to_string()),
        goal_amount: Some(Decimal::from(goal)),
        current_amount: Some(Decimal::from(raised)),
        donor_count: donors,
        start_date: date(2024, 2, 1),
        end_date,
        status: Some(RecordStatus::from_code(status)),
        urgent,
        location: Location::new(city, state),
        organization: organization(org, city, state, None),
        beneficiaries: None,
        impact: None,
        needed_items: Vec::new(),
        recent_donations: Vec::new(),
    }
}

/// The six sample campaigns
pub fn campaigns() -> Vec<CampaignRecord> {
    let mut school = campaign(
        1,
        "Reforma da Escola Municipal",
        "Ajude a reformar a escola que atende 300 crianças da comunidade Vila Esperança.",
        "Educação", 50000, 32500, 127,
        "Associação de Pais Vila Esperança", ("São Paulo", "SP"), "Ativa", false, date(2024, 3, 31),
    );
    school.full_description = Some(
        "A Escola Municipal Vila Esperança atende 300 crianças de famílias de baixa renda da região. \
         As obras incluem reforma do telhado, pintura geral, troca de pisos, reforma dos banheiros, \
         nova rede elétrica e a criação de uma biblioteca."
            .to_string(),
    );
    school.organization = organization(
        "Associação de Pais Vila Esperança",
        "São Paulo",
        "SP",
        Some("contato@escolavilaesperanca.org.br"),
    );
    school.beneficiaries = Some(300);
    school.impact = Some("300 crianças terão um ambiente escolar seguro e adequado para aprender".to_string());
    school.needed_items = vec![
        "Material de construção (R$ 25.000)".to_string(),
        "Mão de obra especializada (R$ 15.000)".to_string(),
        "Mobiliário escolar (R$ 7.000)".to_string(),
        "Equipamentos de segurança (R$ 3.000)".to_string(),
    ];
    school.recent_donations = vec![
        sample_donation("Maria Silva", 500, date(2024, 3, 10), "Pela educação das nossas crianças!"),
        sample_donation("João Santos", 200, date(2024, 3, 9), "Toda criança merece estudar em segurança."),
        sample_donation("Ana Costa", 1000, date(2024, 3, 8), "Investir em educação é investir no futuro."),
    ];

    vec![
        school,
        campaign(
            2,
            "Tratamento para Maria",
            "Maria, de 8 anos, precisa de cirurgia urgente. Sua família não tem condições de pagar.",
            "Saúde", 25000, 18750, 89,
            "Família Silva", ("Rio de Janeiro", "RJ"), "Ativa", true, date(2024, 3, 23),
        ),
        campaign(
            3,
            "Plantio de 1000 Árvores",
            "Campanha para plantar árvores nativas no Parque Municipal e combater o desmatamento.",
            "Meio Ambiente", 15000, 12300, 156,
            "Verde Vida BH", ("Belo Horizonte", "MG"), "Ativa", false, date(2024, 4, 15),
        ),
        campaign(
            4,
            "Cesta Básica para Famílias",
            "Distribuição de cestas básicas para 100 famílias em situação de vulnerabilidade.",
            "Assistência Social", 20000, 20000, 203,
            "Ação Solidária RS", ("Porto Alegre", "RS"), "Concluída", false, date(2024, 3, 1),
        ),
        campaign(
            5,
            "Biblioteca Comunitária",
            "Construção de uma biblioteca comunitária com 2000 livros para a comunidade.",
            "Educação", 35000, 8750, 45,
            "Ler é Crescer", ("Salvador", "BA"), "Ativa", false, date(2024, 4, 30),
        ),
        campaign(
            6,
            "Abrigo para Animais",
            "Construção de um novo abrigo para cães e gatos abandonados com capacidade para 100 animais.",
            "Animais", 80000, 24000, 78,
            "Patinhas Carentes", ("Curitiba", "PR"), "Ativa", false, date(2024, 5, 15),
        ),
    ]
}

fn sample_donation(name: &str, amount: u32, date: Option<DateTime<Utc>>, message: &str) -> DonationRecord {
    DonationRecord {
        donor_name: Some(name.to_string()),
        amount: Decimal::from(amount),
        date,
        message: Some(message.to_string()),
        anonymous: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn project(
    id: u32,
    title: &str,
    description: &str,
    (city, state): (&str, &str),
    cause: &str,
    hours: &str,
    enrolled: u32,
    max_volunteers: u32,
    requirements: &[&str],
    org: &str,
) -> ProjectRecord {
    let roster = (1..=enrolled)
        .map(|n| Enrollment {
            volunteer_id: format!("vol-{}-{:02}", id, n),
            volunteer_name: None,
            status: EnrollmentStatus::Approved,
            enrolled_at: date(2024, 3, 1),
        })
        .collect();

    ProjectRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        full_description: None,
        cause: Some(cause.to_string()),
        location: Location::new(city, state),
        start_date: date(2024, 3, 15),
        end_date: date(2024, 12, 15),
        max_volunteers,
        status: Some(RecordStatus::Active),
        enrollments: roster,
        volunteer_count: None,
        hours_per_week: Some(hours.to_string()),
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
        activities: Vec::new(),
        organization: organization(org, city, state, None),
    }
}

/// The six sample volunteer projects
pub fn projects() -> Vec<ProjectRecord> {
    let mut literacy = project(
        1,
        "Educação para Todos",
        "Projeto de alfabetização para adultos em comunidades carentes. Precisamos de professores voluntários.",
        ("São Paulo", "SP"), "Educação", "4h/semana", 12, 20,
        &["Ensino médio completo", "Paciência para ensinar", "Disponibilidade aos sábados"],
        "Instituto Educar",
    );
    literacy.organization = organization("Instituto Educar", "São Paulo", "SP", Some("contato@institutoeducar.org.br"));
    literacy.activities = vec![
        "Aulas de alfabetização básica".to_string(),
        "Ensino de matemática fundamental".to_string(),
        "Atividades de cidadania".to_string(),
        "Acompanhamento individual dos alunos".to_string(),
        "Eventos culturais e educativos".to_string(),
    ];

    vec![
        literacy,
        project(
            2,
            "Alimentação Solidária",
            "Distribuição de refeições para pessoas em situação de rua. Ajude na preparação e distribuição.",
            ("Rio de Janeiro", "RJ"), "Assistência Social", "6h/semana", 8, 15,
            &["Maior de 16 anos", "Disponibilidade aos domingos", "Disposição para trabalho em equipe"],
            "Ação Solidária RJ",
        ),
        project(
            3,
            "Preservação Ambiental",
            "Plantio de árvores e limpeza de parques urbanos. Contribua para um meio ambiente mais saudável.",
            ("Belo Horizonte", "MG"), "Meio Ambiente", "3h/semana", 15, 25,
            &["Disposição física", "Amor pela natureza", "Disponibilidade aos sábados"],
            "Verde Vida BH",
        ),
        project(
            4,
            "Apoio a Idosos",
            "Companhia e atividades recreativas para idosos em asilos. Leve alegria e carinho para quem precisa.",
            ("Porto Alegre", "RS"), "Assistência Social", "2h/semana", 6, 12,
            &["Paciência", "Empatia", "Disponibilidade flexível"],
            "Cuidar RS",
        ),
        project(
            5,
            "Biblioteca Comunitária",
            "Organização e manutenção de biblioteca em comunidade carente. Ajude a promover o acesso à leitura.",
            ("Salvador", "BA"), "Educação", "5h/semana", 4, 8,
            &["Amor pelos livros", "Organização", "Conhecimento básico de informática"],
            "Ler é Crescer",
        ),
        project(
            6,
            "Cuidado Animal",
            "Cuidados com animais abandonados em ONG. Ajude na alimentação, limpeza e socialização.",
            ("Curitiba", "PR"), "Animais", "4h/semana", 10, 18,
            &["Amor pelos animais", "Não ter medo de cães e gatos", "Disponibilidade aos fins de semana"],
            "Patinhas Carentes",
        ),
    ]
}

fn demo_user() -> FixtureUser {
    FixtureUser {
        profile: UserProfile {
            id: "user-maria".to_string(),
            name: "Maria Silva".to_string(),
            email: DEMO_EMAIL.to_string(),
            city: Some("São Paulo".to_string()),
            state: Some("SP".to_string()),
            phone: Some("(11) 99999-8888".to_string()),
            bio: Some(
                "Apaixonada por educação e voluntariado. Trabalho como professora há 10 anos e dedico meu \
                 tempo livre para ajudar comunidades carentes."
                    .to_string(),
            ),
            experience: None,
            skills: vec!["Ensino".to_string(), "Organização de eventos".to_string()],
            preferred_causes: vec!["Educação".to_string(), "Assistência Social".to_string()],
            user_type: UserType::Volunteer,
            created_at: date(2024, 1, 10),
        },
        password: DEMO_PASSWORD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::Session;
    use rust_decimal_macros::dec;

    async fn signed_in(source: &FixtureDataSource) -> SessionContext {
        let response = source
            .login(&LoginRequest {
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        SessionContext::with_session(Session::new(response.access_token, response.user))
    }

    fn donation(amount: Decimal) -> NewDonation {
        NewDonation {
            amount,
            donor_name: Some("João".to_string()),
            donor_email: "joao@example.com".to_string(),
            message: None,
            anonymous: false,
        }
    }

    #[test]
    fn test_sample_data() {
        let campaigns = campaigns();
        assert_eq!(campaigns.len(), 6);
        assert_eq!(campaigns[3].status, Some(RecordStatus::Completed));
        assert_eq!(campaigns[0].recent_donations.len(), 3);

        let projects = projects();
        assert_eq!(projects.len(), 6);
        assert_eq!(projects[0].enrolled_count(), 12);
        assert_eq!(projects[0].max_volunteers, 20);
    }

    #[tokio::test]
    async fn test_fetch_by_id_and_not_found() {
        let source = FixtureDataSource::new();
        let session = SessionContext::new();
        let campaign = source.fetch_campaign_by_id("1", &session).await.unwrap();
        assert_eq!(campaign.title, "Reforma da Escola Municipal");

        let err = source.fetch_project_by_id("99", &session).await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::not_found("Project", "99")));
    }

    #[tokio::test]
    async fn test_project_query() {
        let source = FixtureDataSource::new();
        let query = ProjectQuery {
            cause: Some("Assistência Social".to_string()),
            ..Default::default()
        };
        let found = source.fetch_projects(Some(&query), &SessionContext::new()).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[tokio::test]
    async fn test_donation_is_applied_to_store() {
        let source = FixtureDataSource::new();
        let session = SessionContext::new();
        source.submit_donation("1", &donation(dec!(100)), &session).await.unwrap();

        let campaign = source.fetch_campaign_by_id("1", &session).await.unwrap();
        assert_eq!(campaign.current_amount, Some(dec!(32600)));
        assert_eq!(campaign.donor_count, 128);
        assert_eq!(campaign.recent_donations[0].amount, dec!(100));

        let err = source.submit_donation("4", &donation(dec!(50)), &session).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_enrollment_requires_session() {
        let source = FixtureDataSource::new();
        let err = source.submit_enrollment("1", &SessionContext::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authentication(_)));

        let session = signed_in(&source).await;
        source.submit_enrollment("1", &session).await.unwrap();
        let project = source.fetch_project_by_id("1", &session).await.unwrap();
        assert_eq!(project.enrolled_count(), 13);

        let again = source.submit_enrollment("1", &session).await.unwrap_err();
        assert!(matches!(again, ServiceError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_register_and_profile() {
        let source = FixtureDataSource::new();
        let bad = source
            .login(&LoginRequest {
                email: DEMO_EMAIL.to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(bad, Err(ServiceError::Authentication(_))));

        let session = signed_in(&source).await;
        let profile = source.fetch_profile(&session).await.unwrap();
        assert_eq!(profile.name, "Maria Silva");

        let updated = source
            .update_profile(
                &UpdateProfile {
                    city: Some("Campinas".to_string()),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Campinas"));

        let request = CreateUserRequest {
            name: "Ana Costa".to_string(),
            email: DEMO_EMAIL.to_uppercase(),
            password: "segredo1".to_string(),
            city: "Salvador".to_string(),
            state: "BA".to_string(),
            user_type: UserType::Volunteer,
            skills: vec![],
            experience: None,
            preferred_causes: vec![],
        };
        assert!(source.register(&request).await.is_err());

        let fresh = CreateUserRequest {
            email: "ana.costa@email.com".to_string(),
            ..request
        };
        let response = source.register(&fresh).await.unwrap();
        assert_eq!(response.user.name, "Ana Costa");
    }
}
