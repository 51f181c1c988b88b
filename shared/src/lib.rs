//! Wire types exchanged with the academia REST backend.
//!
//! Field names follow the backend's JSON contract (Portuguese keys), while
//! the Rust side keeps English names. Dates travel as strings: `YYYY-MM-DD`
//! for calendar dates, RFC 3339 for timestamps and `HH:MM` for times of day.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The message the UI should display verbatim, if the server sent one
    pub fn display_message(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// A page of items extracted from a list envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationInfo>,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, pagination: None }
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "nomeUsuario")]
    pub username: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: SessionUserDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUserDto {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nomeUsuario", default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// SUPER_ADMIN, ADMIN, GERENTE, INSTRUTOR or USUARIO
    #[serde(rename = "perfil")]
    pub role: String,
    /// Grants in `module:action` form
    #[serde(rename = "permissoes", default)]
    pub permissions: Vec<String>,
    #[serde(rename = "empresa", default)]
    pub company: Option<CompanyDto>,
    #[serde(rename = "licenca", default)]
    pub license: Option<LicenseDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDto {
    pub id: String,
    #[serde(rename = "nomeFantasia", default)]
    pub trade_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseDto {
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "dataExpiracao", default)]
    pub expires_on: Option<String>,
    #[serde(rename = "diasRestantes", default)]
    pub days_remaining: Option<i64>,
}

// ---------------------------------------------------------------------------
// Cash register (caixa)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashRegisterDto {
    pub id: String,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "local", default)]
    pub context: String,
    /// RFC 3339 timestamp of the opening
    #[serde(rename = "dataAbertura")]
    pub opened_at: String,
    #[serde(rename = "dataFechamento", default)]
    pub closed_at: Option<String>,
    #[serde(rename = "valorAbertura")]
    pub opening_balance: Decimal,
    #[serde(rename = "valorFechamento", default)]
    pub closing_balance: Option<Decimal>,
    /// Display cache sent by the server; never trusted for balances
    #[serde(rename = "totalEntradas", default)]
    pub total_entries: Option<Decimal>,
    #[serde(rename = "totalSaidas", default)]
    pub total_exits: Option<Decimal>,
    /// ABERTO or FECHADO
    pub status: String,
    #[serde(rename = "movimentos", default)]
    pub movements: Vec<MovementDto>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDto {
    pub id: String,
    /// ENTRADA or SAIDA
    #[serde(rename = "tipo")]
    pub movement_type: String,
    /// REGULAR, SUPRIMENTO or SANGRIA
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "valor")]
    pub amount: Decimal,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "formaPagamento")]
    pub payment_method: String,
    #[serde(rename = "dataHora")]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenCashRegisterRequest {
    #[serde(rename = "local")]
    pub context: String,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "valorAbertura")]
    pub opening_balance: Decimal,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMovementRequest {
    #[serde(rename = "tipo")]
    pub movement_type: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: Decimal,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "formaPagamento")]
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseCashRegisterRequest {
    #[serde(rename = "valorFechamento")]
    pub closing_balance: Decimal,
    #[serde(rename = "observacoes")]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Person and student (pessoa / aluno)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "codigo", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Always FISICA for students
    #[serde(rename = "tipo", default)]
    pub person_type: String,
    #[serde(rename = "empresaId", default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(rename = "nome1")]
    pub name: String,
    #[serde(rename = "nome2", default)]
    pub alternate_name: String,
    #[serde(rename = "doc1")]
    pub document1: String,
    #[serde(rename = "doc2", default)]
    pub document2: String,
    #[serde(rename = "dtNsc", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "situacao", default)]
    pub status: String,
    #[serde(rename = "enderecos", default)]
    pub addresses: Vec<AddressDto>,
    #[serde(rename = "contatos", default)]
    pub contacts: Vec<ContactDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "cep", default)]
    pub postal_code: String,
    #[serde(rename = "logradouro", default)]
    pub street: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "uf", default)]
    pub state_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// CELULAR, TELEFONE_FIXO or EMAIL
    #[serde(rename = "tipo")]
    pub contact_type: String,
    #[serde(rename = "valor")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "local")]
    pub location: String,
    /// SEGUNDA .. DOMINGO
    #[serde(rename = "diasSemana", default)]
    pub days_of_week: Vec<String>,
    #[serde(rename = "horarioEntrada")]
    pub entry_time: String,
    #[serde(rename = "horarioSaida")]
    pub exit_time: String,
}

/// Access-control block sent on create/update.
///
/// `password` is tri-state on the wire: absent keeps the stored credential,
/// `null` removes it, a string replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessControlPayload {
    #[serde(rename = "senha", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Option<String>>,
    #[serde(rename = "impressaoDigital1")]
    pub fingerprint1: Option<String>,
    #[serde(rename = "impressaoDigital2")]
    pub fingerprint2: Option<String>,
}

/// Access-control block as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlDto {
    /// Credential hash; only its presence is ever used
    #[serde(rename = "senha")]
    pub password_hash: Option<String>,
    #[serde(rename = "temSenha")]
    pub has_password: Option<bool>,
    #[serde(rename = "impressaoDigital1")]
    pub fingerprint1: Option<String>,
    #[serde(rename = "impressaoDigital2")]
    pub fingerprint2: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalAssessmentDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "peso")]
    pub weight: Option<Decimal>,
    #[serde(rename = "altura")]
    pub height: Option<Decimal>,
    #[serde(rename = "imc")]
    pub bmi: Option<Decimal>,
    #[serde(rename = "percentualGordura")]
    pub body_fat_percent: Option<Decimal>,
    #[serde(rename = "massaMagra")]
    pub lean_mass: Option<Decimal>,
    #[serde(rename = "massaGorda")]
    pub fat_mass: Option<Decimal>,
    #[serde(rename = "circunferenciaTorax")]
    pub chest: Option<Decimal>,
    #[serde(rename = "circunferenciaCintura")]
    pub waist: Option<Decimal>,
    #[serde(rename = "circunferenciaQuadril")]
    pub hip: Option<Decimal>,
    #[serde(rename = "circunferenciaBracoDireito")]
    pub right_arm: Option<Decimal>,
    #[serde(rename = "circunferenciaBracoEsquerdo")]
    pub left_arm: Option<Decimal>,
    #[serde(rename = "circunferenciaCoxaDireita")]
    pub right_thigh: Option<Decimal>,
    #[serde(rename = "circunferenciaCoxaEsquerda")]
    pub left_thigh: Option<Decimal>,
    #[serde(rename = "circunferenciaPanturrilhaDireita")]
    pub right_calf: Option<Decimal>,
    #[serde(rename = "circunferenciaPanturrilhaEsquerda")]
    pub left_calf: Option<Decimal>,
    #[serde(rename = "observacoes")]
    pub notes: String,
    #[serde(rename = "dataAvaliacao")]
    pub assessed_on: Option<String>,
}

/// Request body for `POST /alunos` and `PUT /alunos/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentPayload {
    #[serde(rename = "pessoaId")]
    pub person_id: String,
    #[serde(rename = "vldExameMedico")]
    pub medical_exam_valid_until: Option<String>,
    #[serde(rename = "vldAvaliacao")]
    pub assessment_valid_until: Option<String>,
    #[serde(rename = "objetivo")]
    pub goal: String,
    #[serde(rename = "profissao")]
    pub profession: String,
    #[serde(rename = "empresa")]
    pub employer: String,
    #[serde(rename = "horarios")]
    pub schedules: Vec<ScheduleDto>,
    #[serde(rename = "controleAcesso")]
    pub access_control: AccessControlPayload,
    #[serde(rename = "avaliacaoFisica", skip_serializing_if = "Option::is_none")]
    pub physical_assessment: Option<PhysicalAssessmentDto>,
}

/// Student as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentDto {
    pub id: String,
    #[serde(rename = "pessoaId")]
    pub person_id: String,
    #[serde(rename = "pessoa")]
    pub person: Option<PersonDto>,
    /// Enrollment number shown in lists
    #[serde(rename = "matricula")]
    pub registration: Option<String>,
    #[serde(rename = "vldExameMedico")]
    pub medical_exam_valid_until: Option<String>,
    #[serde(rename = "vldAvaliacao")]
    pub assessment_valid_until: Option<String>,
    #[serde(rename = "objetivo")]
    pub goal: String,
    #[serde(rename = "profissao")]
    pub profession: String,
    #[serde(rename = "empresa")]
    pub employer: String,
    #[serde(rename = "horarios")]
    pub schedules: Vec<ScheduleDto>,
    #[serde(rename = "controleAcesso")]
    pub access_control: Option<AccessControlDto>,
    #[serde(rename = "avaliacaoFisica")]
    pub physical_assessment: Option<PhysicalAssessmentDto>,
}

// ---------------------------------------------------------------------------
// Enrollment (matricula)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDto {
    pub id: String,
    #[serde(rename = "alunoId")]
    pub student_id: String,
    #[serde(rename = "planoId")]
    pub plan_id: String,
    #[serde(rename = "aluno", default)]
    pub student: Option<StudentDto>,
    #[serde(rename = "plano", default)]
    pub plan: Option<PlanDto>,
    #[serde(rename = "dataInicio")]
    pub start_date: String,
    #[serde(rename = "diaVencimento")]
    pub due_day: u8,
    #[serde(rename = "valorFinal")]
    pub final_value: Decimal,
    /// ATIVA, INATIVA or PENDENTE
    pub status: String,
    #[serde(rename = "motivoInativacao", default)]
    pub deactivation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEnrollmentRequest {
    #[serde(rename = "alunoId")]
    pub student_id: String,
    #[serde(rename = "planoId")]
    pub plan_id: String,
    #[serde(rename = "dataInicio")]
    pub start_date: String,
    #[serde(rename = "diaVencimento")]
    pub due_day: u8,
    #[serde(rename = "valorFinal")]
    pub final_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeactivateEnrollmentRequest {
    #[serde(rename = "motivo")]
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Plans, users, exercises
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "codigo", default)]
    pub code: String,
    #[serde(rename = "nome")]
    pub name: String,
    /// MENSAL, MESES or DIAS
    #[serde(rename = "periodicidade", default)]
    pub periodicity: String,
    #[serde(rename = "numeroMeses", default)]
    pub months: Option<u32>,
    #[serde(rename = "numeroDias", default)]
    pub days: Option<u32>,
    #[serde(rename = "valorMensalidade", default)]
    pub monthly_fee: Decimal,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "empresaId", default)]
    pub company_id: String,
    #[serde(rename = "nomeUsuario")]
    pub username: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "perfil")]
    pub role: String,
    #[serde(rename = "permissoes", default)]
    pub permissions: Vec<String>,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "situacao", default)]
    pub status: String,
    /// Only ever sent, never received
    #[serde(rename = "senha", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "grupoId", default)]
    pub group_id: Option<String>,
    #[serde(rename = "musculos", default)]
    pub muscles: Vec<String>,
    #[serde(rename = "imagemUrl", default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    #[serde(alias = "imagemUrl")]
    pub url: String,
}
