//! Conversions between wire DTOs (`shared`) and domain types.
//!
//! Decoding is strict about what the domain relies on (ids, dates,
//! statuses) and lenient about display-only fields. Failures surface as
//! [`ApiError::Decode`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use shared::{
    AccessControlPayload, AddressDto, CashRegisterDto, CloseCashRegisterRequest, CompanyDto, ContactDto,
    CreateEnrollmentRequest, EnrollmentDto, ExerciseDto, LicenseDto, MovementDto, OpenCashRegisterRequest,
    PersonDto, PhysicalAssessmentDto, PlanDto, RecordMovementRequest, ScheduleDto, SessionUserDto, StudentDto,
    StudentPayload, UserDto,
};

use crate::domain::models::cash_register::{
    CashRegister, CashRegisterStatus, Movement, MovementKind, NewCashRegister, NewMovement, PaymentMethod,
    RegisterClosing,
};
use crate::domain::models::enrollment::{Enrollment, EnrollmentStatus, NewEnrollment};
use crate::domain::models::exercise::{Exercise, ExerciseDraft};
use crate::domain::models::physical_assessment::{Circumferences, PhysicalAssessment};
use crate::domain::models::plan::{Periodicity, Plan, PlanPayload};
use crate::domain::models::student::{
    AccessControl, Address, Contact, ContactType, CredentialChange, Person, PersonPayload, Schedule,
    StudentRecord, StudentSavePayload, Weekday,
};
use crate::domain::models::user::{Role, SystemUser, UserPayload};
use crate::domain::models::RecordStatus;
use crate::domain::session::{Company, License, SessionUser};
use crate::io::ApiError;

type MapResult<T> = Result<T, ApiError>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const PERSON_TYPE: &str = "FISICA";

fn decode_err(what: &str, value: &str) -> ApiError {
    ApiError::Decode(format!("invalid {}: {:?}", what, value))
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` read as UTC
pub fn parse_timestamp(value: &str) -> MapResult<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc()))
        .map_err(|_| decode_err("timestamp", value))
}

/// Calendar date; a trailing time part is ignored
pub fn parse_date(value: &str) -> MapResult<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| decode_err("date", value))
}

fn parse_optional_date(value: Option<&str>) -> MapResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).map(Some),
        None => Ok(None),
    }
}

pub fn parse_time(value: &str) -> MapResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| decode_err("time", value))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Cash register
// ---------------------------------------------------------------------------

pub struct CashRegisterMapper;

impl CashRegisterMapper {
    pub fn from_dto(dto: CashRegisterDto) -> MapResult<CashRegister> {
        let status = CashRegisterStatus::from_wire(&dto.status).ok_or_else(|| decode_err("register status", &dto.status))?;
        let movements = dto
            .movements
            .into_iter()
            .map(Self::movement_from_dto)
            .collect::<MapResult<Vec<_>>>()?;

        Ok(CashRegister {
            id: dto.id,
            number: dto.number,
            context: dto.context,
            opened_at: parse_timestamp(&dto.opened_at)?,
            closed_at: dto.closed_at.as_deref().map(parse_timestamp).transpose()?,
            opening_balance: dto.opening_balance,
            closing_balance: dto.closing_balance,
            status,
            movements,
            notes: dto.notes.and_then(|n| non_empty(&n)),
        })
    }

    pub fn movement_from_dto(dto: MovementDto) -> MapResult<Movement> {
        let kind = MovementKind::from_wire(&dto.movement_type, dto.category.as_deref())
            .ok_or_else(|| decode_err("movement type", &dto.movement_type))?;
        Ok(Movement {
            id: dto.id,
            kind,
            amount: dto.amount,
            description: dto.description,
            payment_method: PaymentMethod::from_wire(&dto.payment_method),
            timestamp: parse_timestamp(&dto.timestamp)?,
        })
    }

    pub fn open_request(register: &NewCashRegister) -> OpenCashRegisterRequest {
        OpenCashRegisterRequest {
            context: register.context.clone(),
            number: register.number,
            opening_balance: register.opening_balance,
            notes: register.notes.clone(),
        }
    }

    pub fn movement_request(movement: &NewMovement) -> RecordMovementRequest {
        RecordMovementRequest {
            movement_type: movement.kind.direction().as_wire().to_string(),
            category: movement.kind.category_wire().to_string(),
            amount: movement.amount,
            description: movement.description.clone(),
            payment_method: movement.payment_method.as_wire().to_string(),
        }
    }

    pub fn close_request(closing: &RegisterClosing) -> CloseCashRegisterRequest {
        CloseCashRegisterRequest {
            closing_balance: closing.closing_balance,
            notes: closing.notes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Person and student
// ---------------------------------------------------------------------------

pub struct StudentMapper;

impl StudentMapper {
    pub fn person_to_dto(person: &PersonPayload) -> PersonDto {
        PersonDto {
            id: None,
            code: person.code.clone(),
            person_type: PERSON_TYPE.to_string(),
            company_id: person.company_id.clone(),
            name: person.name.clone(),
            alternate_name: person.alternate_name.clone(),
            document1: person.document1.clone(),
            document2: person.document2.clone(),
            birth_date: person.birth_date.map(format_date),
            status: person.status.as_wire().to_string(),
            addresses: person
                .addresses
                .iter()
                .map(|a| AddressDto {
                    id: a.id.clone(),
                    postal_code: a.postal_code.clone(),
                    street: a.street.clone(),
                    city: a.city.clone(),
                    state_code: a.state_code.clone(),
                })
                .collect(),
            contacts: person
                .contacts
                .iter()
                .map(|c| ContactDto {
                    id: c.id.clone(),
                    contact_type: c.contact_type.as_wire().to_string(),
                    value: c.value.clone(),
                })
                .collect(),
        }
    }

    pub fn person_from_dto(dto: PersonDto) -> MapResult<Person> {
        let id = dto.id.ok_or_else(|| ApiError::Decode("person without id".to_string()))?;
        Ok(Person {
            id,
            code: dto.code,
            company_id: dto.company_id,
            name: dto.name,
            alternate_name: dto.alternate_name,
            document1: dto.document1,
            document2: dto.document2,
            birth_date: parse_optional_date(dto.birth_date.as_deref())?,
            status: RecordStatus::from_wire(&dto.status),
            addresses: dto
                .addresses
                .into_iter()
                .map(|a| Address {
                    id: a.id,
                    postal_code: a.postal_code,
                    street: a.street,
                    city: a.city,
                    state_code: a.state_code,
                })
                .collect(),
            contacts: dto
                .contacts
                .into_iter()
                .map(|c| Contact {
                    id: c.id,
                    contact_type: ContactType::from_wire(&c.contact_type).unwrap_or_default(),
                    value: c.value,
                })
                .collect(),
        })
    }

    pub fn schedule_to_dto(schedule: &Schedule) -> ScheduleDto {
        ScheduleDto {
            id: schedule.id.clone(),
            location: schedule.location.clone(),
            days_of_week: schedule.days.iter().map(|d| d.as_wire().to_string()).collect(),
            entry_time: schedule.entry_time.format("%H:%M").to_string(),
            exit_time: schedule.exit_time.format("%H:%M").to_string(),
        }
    }

    pub fn schedule_from_dto(dto: ScheduleDto) -> MapResult<Schedule> {
        Ok(Schedule {
            id: dto.id,
            location: dto.location,
            days: dto.days_of_week.iter().filter_map(|d| Weekday::from_wire(d)).collect(),
            entry_time: parse_time(&dto.entry_time)?,
            exit_time: parse_time(&dto.exit_time)?,
        })
    }

    pub fn assessment_to_dto(assessment: &PhysicalAssessment) -> PhysicalAssessmentDto {
        let c = &assessment.circumferences;
        PhysicalAssessmentDto {
            id: assessment.id.clone(),
            weight: assessment.weight,
            height: assessment.height,
            bmi: assessment.bmi,
            body_fat_percent: assessment.body_fat_percent,
            lean_mass: assessment.lean_mass,
            fat_mass: assessment.fat_mass,
            chest: c.chest,
            waist: c.waist,
            hip: c.hip,
            right_arm: c.right_arm,
            left_arm: c.left_arm,
            right_thigh: c.right_thigh,
            left_thigh: c.left_thigh,
            right_calf: c.right_calf,
            left_calf: c.left_calf,
            notes: assessment.notes.clone(),
            assessed_on: assessment.assessed_on.map(format_date),
        }
    }

    pub fn assessment_from_dto(dto: PhysicalAssessmentDto) -> MapResult<PhysicalAssessment> {
        Ok(PhysicalAssessment {
            id: dto.id,
            weight: dto.weight,
            height: dto.height,
            bmi: dto.bmi,
            body_fat_percent: dto.body_fat_percent,
            lean_mass: dto.lean_mass,
            fat_mass: dto.fat_mass,
            circumferences: Circumferences {
                chest: dto.chest,
                waist: dto.waist,
                hip: dto.hip,
                right_arm: dto.right_arm,
                left_arm: dto.left_arm,
                right_thigh: dto.right_thigh,
                left_thigh: dto.left_thigh,
                right_calf: dto.right_calf,
                left_calf: dto.left_calf,
            },
            notes: dto.notes,
            assessed_on: parse_optional_date(dto.assessed_on.as_deref())?,
        })
    }

    /// Request body for the student step. The credential change becomes the
    /// wire tri-state: absent, `null` or a new value.
    pub fn student_payload(person_id: &str, student: &StudentSavePayload) -> StudentPayload {
        let password = match &student.credential {
            CredentialChange::Keep => None,
            CredentialChange::Remove => Some(None),
            CredentialChange::Replace(secret) => Some(Some(secret.clone())),
        };
        StudentPayload {
            person_id: person_id.to_string(),
            medical_exam_valid_until: student.medical_exam_valid_until.map(format_date),
            assessment_valid_until: student.assessment_valid_until.map(format_date),
            goal: student.goal.clone(),
            profession: student.profession.clone(),
            employer: student.employer.clone(),
            schedules: student.schedules.iter().map(Self::schedule_to_dto).collect(),
            access_control: AccessControlPayload {
                password,
                fingerprint1: student.fingerprint1.clone(),
                fingerprint2: student.fingerprint2.clone(),
            },
            physical_assessment: student.physical_assessment.as_ref().map(Self::assessment_to_dto),
        }
    }

    /// Decode a student. `fallback_person` is used when the response does
    /// not embed the person.
    pub fn student_from_dto(dto: StudentDto, fallback_person: Option<Person>) -> MapResult<StudentRecord> {
        let person = match dto.person {
            Some(person) => {
                let mut person_dto = person;
                person_dto.id.get_or_insert_with(|| dto.person_id.clone());
                Self::person_from_dto(person_dto)?
            }
            None => fallback_person.unwrap_or_else(|| Person {
                id: dto.person_id.clone(),
                ..Default::default()
            }),
        };

        let access = dto
            .access_control
            .map(|ac| AccessControl {
                has_password: ac.has_password.unwrap_or(false) || ac.password_hash.as_deref().is_some_and(|h| !h.is_empty()),
                fingerprint1: ac.fingerprint1.and_then(|f| non_empty(&f)),
                fingerprint2: ac.fingerprint2.and_then(|f| non_empty(&f)),
            })
            .unwrap_or_default();

        Ok(StudentRecord {
            id: dto.id,
            person,
            registration: dto.registration,
            medical_exam_valid_until: parse_optional_date(dto.medical_exam_valid_until.as_deref())?,
            assessment_valid_until: parse_optional_date(dto.assessment_valid_until.as_deref())?,
            goal: dto.goal,
            profession: dto.profession,
            employer: dto.employer,
            schedules: dto
                .schedules
                .into_iter()
                .map(Self::schedule_from_dto)
                .collect::<MapResult<Vec<_>>>()?,
            access,
            physical_assessment: dto.physical_assessment.map(Self::assessment_from_dto).transpose()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Enrollment, plan, user, exercise
// ---------------------------------------------------------------------------

pub struct EnrollmentMapper;

impl EnrollmentMapper {
    pub fn from_dto(dto: EnrollmentDto) -> MapResult<Enrollment> {
        let status = EnrollmentStatus::from_wire(&dto.status).ok_or_else(|| decode_err("enrollment status", &dto.status))?;
        let student_person = dto.student.as_ref().and_then(|s| s.person.as_ref());
        Ok(Enrollment {
            student_name: student_person.map(|p| p.name.clone()),
            student_document: student_person.map(|p| p.document1.clone()),
            plan_name: dto.plan.as_ref().map(|p| p.name.clone()),
            id: dto.id,
            student_id: dto.student_id,
            plan_id: dto.plan_id,
            start_date: parse_date(&dto.start_date)?,
            due_day: dto.due_day,
            final_value: dto.final_value,
            status,
            deactivation_reason: dto.deactivation_reason.and_then(|r| non_empty(&r)),
        })
    }

    pub fn create_request(enrollment: &NewEnrollment) -> CreateEnrollmentRequest {
        CreateEnrollmentRequest {
            student_id: enrollment.student_id.clone(),
            plan_id: enrollment.plan_id.clone(),
            start_date: format_date(enrollment.start_date),
            due_day: enrollment.due_day,
            final_value: enrollment.final_value,
        }
    }
}

pub struct PlanMapper;

impl PlanMapper {
    pub fn to_dto(plan: &PlanPayload) -> PlanDto {
        PlanDto {
            id: None,
            code: plan.code.clone(),
            name: plan.name.clone(),
            periodicity: plan.periodicity.as_wire().to_string(),
            months: plan.months,
            days: plan.days,
            monthly_fee: plan.monthly_fee,
            description: plan.description.clone(),
            status: plan.status.as_wire().to_string(),
        }
    }

    pub fn from_dto(dto: PlanDto) -> MapResult<Plan> {
        Ok(Plan {
            id: dto.id.ok_or_else(|| ApiError::Decode("plan without id".to_string()))?,
            code: dto.code,
            name: dto.name,
            periodicity: Periodicity::from_wire(&dto.periodicity).unwrap_or_default(),
            months: dto.months,
            days: dto.days,
            monthly_fee: dto.monthly_fee,
            description: dto.description.and_then(|d| non_empty(&d)),
            status: RecordStatus::from_wire(&dto.status),
        })
    }
}

pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(user: &UserPayload) -> UserDto {
        UserDto {
            id: None,
            company_id: user.company_id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_wire().to_string(),
            permissions: user.permissions.clone(),
            phone: user.phone.clone(),
            status: user.status.as_wire().to_string(),
            password: user.password.clone(),
        }
    }

    pub fn from_dto(dto: UserDto) -> MapResult<SystemUser> {
        Ok(SystemUser {
            id: dto.id.ok_or_else(|| ApiError::Decode("user without id".to_string()))?,
            company_id: dto.company_id,
            username: dto.username,
            name: dto.name,
            email: dto.email,
            role: Role::from_wire(&dto.role).ok_or_else(|| decode_err("role", &dto.role))?,
            permissions: dto.permissions,
            phone: dto.phone,
            status: RecordStatus::from_wire(&dto.status),
        })
    }
}

pub struct ExerciseMapper;

impl ExerciseMapper {
    pub fn to_dto(exercise: &ExerciseDraft) -> ExerciseDto {
        ExerciseDto {
            id: None,
            name: exercise.name.clone(),
            description: exercise.description.clone(),
            group_id: exercise.group_id.clone(),
            muscles: exercise.muscles.clone(),
            image_url: exercise.image_url.clone(),
        }
    }

    pub fn from_dto(dto: ExerciseDto) -> MapResult<Exercise> {
        Ok(Exercise {
            id: dto.id.ok_or_else(|| ApiError::Decode("exercise without id".to_string()))?,
            name: dto.name,
            description: dto.description,
            group_id: dto.group_id,
            muscles: dto.muscles,
            image_url: dto.image_url,
        })
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct SessionMapper;

impl SessionMapper {
    pub fn from_dto(dto: SessionUserDto) -> MapResult<SessionUser> {
        let role = Role::from_wire(&dto.role).ok_or_else(|| decode_err("role", &dto.role))?;
        Ok(SessionUser {
            id: dto.id,
            name: dto.name,
            username: dto.username,
            email: dto.email.and_then(|e| non_empty(&e)),
            role,
            permissions: dto.permissions,
            company: dto.company.map(Self::company_from_dto),
            license: dto.license.map(Self::license_from_dto).transpose()?,
        })
    }

    fn company_from_dto(dto: CompanyDto) -> Company {
        Company {
            id: dto.id,
            trade_name: dto.trade_name,
        }
    }

    fn license_from_dto(dto: LicenseDto) -> MapResult<License> {
        Ok(License {
            kind: dto.kind,
            expires_on: parse_optional_date(dto.expires_on.as_deref())?,
            days_remaining: dto.days_remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_register_from_backend_json() {
        let dto: CashRegisterDto = serde_json::from_value(json!({
            "id": "cx-1",
            "numero": 3,
            "local": "principal",
            "dataAbertura": "2026-10-19T08:00:00.000Z",
            "valorAbertura": 100,
            "totalEntradas": 999,
            "status": "ABERTO",
            "movimentos": [
                {"id": "m1", "tipo": "ENTRADA", "categoria": "SUPRIMENTO", "valor": 50,
                 "descricao": "Troco", "formaPagamento": "DINHEIRO", "dataHora": "2026-10-19T08:05:00"},
                {"id": "m2", "tipo": "SAIDA", "valor": 20,
                 "descricao": "Material", "formaPagamento": "VALE", "dataHora": "2026-10-19T09:00:00Z"}
            ]
        }))
        .unwrap();

        let register = CashRegisterMapper::from_dto(dto).unwrap();
        assert!(register.is_open());
        assert_eq!(register.movements[0].kind, MovementKind::Supply);
        assert_eq!(register.movements[1].kind, MovementKind::Exit);
        assert_eq!(register.movements[1].payment_method, PaymentMethod::Other("VALE".to_string()));
        // The server's cached totals are ignored
        assert_eq!(register.total_entries(), Decimal::from(50));
        assert_eq!(register.running_balance(), Decimal::from(130));
    }

    #[test]
    fn test_movement_request_carries_category() {
        let request = CashRegisterMapper::movement_request(&NewMovement {
            kind: MovementKind::Withdrawal,
            amount: Decimal::from(10),
            description: "Sangria".to_string(),
            payment_method: PaymentMethod::Cash,
            timestamp: Utc::now(),
        });
        assert_eq!(request.movement_type, "SAIDA");
        assert_eq!(request.category, "SANGRIA");
        assert_eq!(request.payment_method, "DINHEIRO");
    }

    #[test]
    fn test_credential_tri_state_on_the_wire() {
        let mut payload = StudentSavePayload {
            person: PersonPayload::default(),
            medical_exam_valid_until: NaiveDate::from_ymd_opt(2027, 1, 31),
            assessment_valid_until: None,
            goal: String::new(),
            profession: String::new(),
            employer: String::new(),
            schedules: Vec::new(),
            credential: CredentialChange::Keep,
            fingerprint1: None,
            fingerprint2: None,
            physical_assessment: None,
        };

        let keep = serde_json::to_value(StudentMapper::student_payload("p1", &payload)).unwrap();
        assert!(keep["controleAcesso"].get("senha").is_none());
        assert_eq!(keep["vldExameMedico"], json!("2027-01-31"));
        assert!(keep.get("avaliacaoFisica").is_none());

        payload.credential = CredentialChange::Remove;
        let remove = serde_json::to_value(StudentMapper::student_payload("p1", &payload)).unwrap();
        assert_eq!(remove["controleAcesso"]["senha"], serde_json::Value::Null);

        payload.credential = CredentialChange::Replace("1234".to_string());
        let replace = serde_json::to_value(StudentMapper::student_payload("p1", &payload)).unwrap();
        assert_eq!(replace["controleAcesso"]["senha"], json!("1234"));
    }

    #[test]
    fn test_student_from_dto() {
        let dto: StudentDto = serde_json::from_value(json!({
            "id": "al-1",
            "pessoaId": "pe-1",
            "pessoa": {"nome1": "Ana Lima", "doc1": "123", "dtNsc": "1990-05-02T00:00:00.000Z",
                       "situacao": "ATIVO", "contatos": [{"tipo": "EMAIL", "valor": "ana@x.com"}]},
            "horarios": [{"local": "Sala 1", "diasSemana": ["SEGUNDA", "QUARTA"],
                          "horarioEntrada": "07:00", "horarioSaida": "08:00:00"}],
            "controleAcesso": {"senha": "hash", "impressaoDigital1": ""},
            "avaliacaoFisica": {"peso": 70, "altura": 1.7, "imc": 24.22, "observacoes": ""}
        }))
        .unwrap();

        let record = StudentMapper::student_from_dto(dto, None).unwrap();
        assert_eq!(record.person.id, "pe-1");
        assert_eq!(record.person.birth_date, NaiveDate::from_ymd_opt(1990, 5, 2));
        assert_eq!(record.person.contacts[0].contact_type, ContactType::Email);
        assert_eq!(record.schedules[0].days.len(), 2);
        assert!(record.access.has_password);
        assert_eq!(record.access.fingerprint1, None);
        assert_eq!(record.physical_assessment.unwrap().bmi, Some(Decimal::new(2422, 2)));
    }

    #[test]
    fn test_plan_payload_sends_nulls() {
        let dto = PlanMapper::to_dto(&PlanPayload {
            code: "PL1".to_string(),
            name: "Mensal".to_string(),
            periodicity: Periodicity::Monthly,
            months: None,
            days: None,
            monthly_fee: Decimal::from(99),
            description: None,
            status: RecordStatus::Active,
        });
        let value = serde_json::to_value(dto).unwrap();
        assert_eq!(value["numeroMeses"], serde_json::Value::Null);
        assert_eq!(value["numeroDias"], serde_json::Value::Null);
        assert_eq!(value["periodicidade"], json!("MENSAL"));
    }

    #[test]
    fn test_session_user_from_login() {
        let dto: SessionUserDto = serde_json::from_value(json!({
            "id": "u1",
            "nome": "Gerente",
            "nomeUsuario": "gerente",
            "perfil": "GERENTE",
            "permissoes": ["caixa:acessar"],
            "empresa": {"id": "e1", "nomeFantasia": "Academia Forte"},
            "licenca": {"tipo": "ANUAL", "dataExpiracao": "2027-01-01", "diasRestantes": 74}
        }))
        .unwrap();

        let user = SessionMapper::from_dto(dto).unwrap();
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.company.unwrap().trade_name, "Academia Forte");
        assert_eq!(user.license.unwrap().expires_on, NaiveDate::from_ymd_opt(2027, 1, 1));
    }

    #[test]
    fn test_bad_values_are_decode_errors() {
        assert!(matches!(parse_timestamp("ontem"), Err(ApiError::Decode(_))));
        assert!(matches!(parse_date("31/12/2026"), Err(ApiError::Decode(_))));
        assert!(parse_time("7h").is_err());
    }
}
